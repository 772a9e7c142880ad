//! Transport port for outbound enrichment calls

use async_trait::async_trait;
use thiserror::Error;

use super::request::EnrichmentRequest;

/// Whatever the service answered, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A call that produced no reply at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Sent, but nothing came back: refused, timed out, DNS, reset
    #[error("no response: {0}")]
    NoResponse(String),

    /// Could not even be built or sent
    #[error("request setup failed: {0}")]
    Setup(String),
}

/// POSTs one already serialized payload
#[async_trait]
pub trait EnrichmentTransport: Send + Sync {
    async fn post(&self, request: &EnrichmentRequest) -> Result<UpstreamReply, TransportFailure>;
}
