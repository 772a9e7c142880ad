//! Correlation of per-item replies with the parcel that produced them
//!
//! The identifier is read back from each call's own payload, never inferred
//! from position, so completion order does not matter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dispatcher::SettledCall;
use crate::config::EnrichmentTarget;
use crate::error::EnrichmentError;
use crate::parcel::Identifier;

/// Enrichment output for one parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    #[serde(rename = "_id")]
    pub identifier: Identifier,
    pub data: Value,
}

/// Pair each settled call with its identifier, keeping the calls' order
pub fn correlate(
    target: &EnrichmentTarget,
    calls: Vec<SettledCall>,
) -> Result<Vec<EnrichmentResult>, EnrichmentError> {
    calls
        .into_iter()
        .map(|call| -> Result<EnrichmentResult, EnrichmentError> {
            let identifier = call.request.identifier().ok_or_else(|| {
                EnrichmentError::RequestSetupError {
                    service: target.description.clone(),
                    reason: "payload carries no parcel identifier".to_string(),
                }
            })?;

            Ok(EnrichmentResult {
                identifier,
                data: reply_data(&call.reply.body),
            })
        })
        .collect()
}

/// JSON bodies stay JSON; anything else is carried as a string
pub fn reply_data(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
