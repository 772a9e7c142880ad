//! Error taxonomy for the enrichment pipeline
//!
//! Every failure the orchestrator can report to a caller is one variant of
//! [`EnrichmentError`]. Apart from body decoding, which the HTTP layer does
//! first, variants are checked and produced in pipeline order: target
//! lookup, batch validation, geometry resolution, then dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parcel::Identifier;
use crate::store::StoreError;

/// Caller-facing failure of one enrichment run
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("No parcel given !")]
    EmptyBatch,

    #[error("At least one parcel has not been found ! ({})", .missing.join(", "))]
    PartialLookupFailure { missing: Vec<Identifier> },

    #[error("Unknown enrichment target '{0}'")]
    UnknownTarget(String),

    /// Request body rejected before it reaches the pipeline
    #[error("Malformed request: {reason}")]
    MalformedRequest { status: u16, reason: String },

    #[error("Geometry store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Error while retrieving {service}: upstream responded with status {status}")]
    UpstreamError {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Service to retrieve {service} not reachable: {reason}")]
    ServiceUnreachable { service: String, reason: String },

    #[error("Could not send request for {service}: {reason}")]
    RequestSetupError { service: String, reason: String },
}

/// Stable tag for each failure category, used in the failure envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    EmptyBatch,
    PartialLookupFailure,
    UnknownTarget,
    MalformedRequest,
    StoreUnavailable,
    UpstreamError,
    ServiceUnreachable,
    RequestSetupError,
}

impl EnrichmentError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyBatch => FailureKind::EmptyBatch,
            Self::PartialLookupFailure { .. } => FailureKind::PartialLookupFailure,
            Self::UnknownTarget(_) => FailureKind::UnknownTarget,
            Self::MalformedRequest { .. } => FailureKind::MalformedRequest,
            Self::StoreUnavailable(_) => FailureKind::StoreUnavailable,
            Self::UpstreamError { .. } => FailureKind::UpstreamError,
            Self::ServiceUnreachable { .. } => FailureKind::ServiceUnreachable,
            Self::RequestSetupError { .. } => FailureKind::RequestSetupError,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::EmptyBatch => 400,
            Self::PartialLookupFailure { .. } => 400,
            Self::UnknownTarget(_) => 404,
            Self::MalformedRequest { status, .. } => *status,
            Self::StoreUnavailable(_) => 503,
            Self::UpstreamError { .. } => 502,
            Self::ServiceUnreachable { .. } => 503,
            Self::RequestSetupError { .. } => 500,
        }
    }

    /// Message safe to hand back to the caller.
    ///
    /// Store, transport and request-setup details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::StoreUnavailable(_) => "Geometry store unavailable !".to_string(),
            Self::ServiceUnreachable { service, .. } => {
                format!("Service to retrieve {service} not reachable !")
            }
            Self::RequestSetupError { service, .. } => {
                format!("Error while preparing the request for {service} !")
            }
            other => other.to_string(),
        }
    }
}
