//! reqwest-backed enrichment transport

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::debug;

use super::request::EnrichmentRequest;
use super::transport::{EnrichmentTransport, TransportFailure, UpstreamReply};

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Every call, connect included, is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl EnrichmentTransport for HttpTransport {
    async fn post(&self, request: &EnrichmentRequest) -> Result<UpstreamReply, TransportFailure> {
        let response = self
            .client
            .post(request.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(request.payload.clone())
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status().as_u16();
        debug!(url = %request.url, status, "Enrichment service replied");

        match response.text().await {
            Ok(body) => Ok(UpstreamReply { status, body }),
            // the status line arrived; a non-2xx stays an upstream error
            Err(_) if !(200..300).contains(&status) => Ok(UpstreamReply {
                status,
                body: String::new(),
            }),
            Err(e) => Err(TransportFailure::NoResponse(format!(
                "response body interrupted: {e}"
            ))),
        }
    }
}

fn transport_failure(error: reqwest::Error) -> TransportFailure {
    if error.is_builder() {
        TransportFailure::Setup(error.to_string())
    } else {
        TransportFailure::NoResponse(error.to_string())
    }
}
