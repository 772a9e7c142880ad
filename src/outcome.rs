//! Tagged caller-facing envelopes
//!
//! Success and failure are told apart by the `status` tag, never by which
//! fields happen to be present.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enrichment::EnrichmentResult;
use crate::error::{EnrichmentError, FailureKind};
use crate::parcel::Identifier;

/// Successful output of one enrichment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Enrichment {
    /// Per-item mode, in completion order
    Items(Vec<EnrichmentResult>),
    /// Batch mode: the service's aggregate reply as-is
    Aggregate(Value),
}

impl Enrichment {
    /// Identifiers covered by a per-item result
    pub fn identifiers(&self) -> Vec<&str> {
        match self {
            Self::Items(items) => items.iter().map(|i| i.identifier.as_str()).collect(),
            Self::Aggregate(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    Success {
        target: String,
        items: Enrichment,
    },
    Failure {
        kind: FailureKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        missing: Option<Vec<Identifier>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upstream_status: Option<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upstream_body: Option<String>,
    },
}

impl EnrichmentOutcome {
    pub fn success(target: impl Into<String>, items: Enrichment) -> Self {
        Self::Success {
            target: target.into(),
            items,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<&EnrichmentError> for EnrichmentOutcome {
    fn from(error: &EnrichmentError) -> Self {
        let (missing, upstream_status, upstream_body) = match error {
            EnrichmentError::PartialLookupFailure { missing } => (Some(missing.clone()), None, None),
            EnrichmentError::UpstreamError { status, body, .. } => {
                (None, Some(*status), Some(body.clone()))
            }
            _ => (None, None, None),
        };

        Self::Failure {
            kind: error.kind(),
            message: error.public_message(),
            missing,
            upstream_status,
            upstream_body,
        }
    }
}
