//! Failure classification of settled enrichment calls
//!
//! Checked in priority order: a reply with a non-2xx status, then a call that
//! got no reply, then a call that could not be set up. Nothing is retried.

use tracing::warn;

use super::transport::{TransportFailure, UpstreamReply};
use crate::config::EnrichmentTarget;
use crate::error::EnrichmentError;

/// Turn the raw outcome of one call into a 2xx reply or a caller-facing error
pub fn classify(
    target: &EnrichmentTarget,
    outcome: Result<UpstreamReply, TransportFailure>,
) -> Result<UpstreamReply, EnrichmentError> {
    let service = target.description.clone();

    match outcome {
        Ok(reply) if reply.is_success() => Ok(reply),
        Ok(reply) => {
            warn!(
                target_name = %target.name,
                status = reply.status,
                body = %reply.body,
                "Enrichment service returned an error"
            );
            Err(EnrichmentError::UpstreamError {
                service,
                status: reply.status,
                body: reply.body,
            })
        }
        Err(TransportFailure::NoResponse(reason)) => {
            warn!(target_name = %target.name, %reason, "Enrichment service not reachable");
            Err(EnrichmentError::ServiceUnreachable { service, reason })
        }
        Err(TransportFailure::Setup(reason)) => {
            warn!(target_name = %target.name, %reason, "Enrichment request could not be sent");
            Err(EnrichmentError::RequestSetupError { service, reason })
        }
    }
}
