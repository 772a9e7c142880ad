//! Outbound enrichment requests
//!
//! The payload is serialized once, here, and the very same bytes are sent and
//! later read back by the correlator.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::EnrichmentTarget;
use crate::error::EnrichmentError;
use crate::parcel::{FeatureCollection, GeometryRecord, Identifier};

/// Caller query parameters, in the order received
pub type QueryParams = Vec<(String, String)>;

#[derive(Debug, Clone)]
pub struct EnrichmentRequest {
    /// Endpoint with the forwarded query string already appended
    pub url: Url,
    pub query: QueryParams,
    /// Serialized JSON body
    pub payload: Vec<u8>,
}

impl EnrichmentRequest {
    /// One request for one parcel.
    ///
    /// `query` is appended only when the target forwards caller parameters.
    pub fn for_record(
        target: &EnrichmentTarget,
        record: &GeometryRecord,
        query: &QueryParams,
    ) -> Result<Self, EnrichmentError> {
        let query = if target.forward_query {
            query.clone()
        } else {
            QueryParams::new()
        };
        Self::build(target, record, query)
    }

    /// One request carrying every parcel
    pub fn for_collection(
        target: &EnrichmentTarget,
        collection: &FeatureCollection,
    ) -> Result<Self, EnrichmentError> {
        Self::build(target, collection, QueryParams::new())
    }

    fn build<T: Serialize>(
        target: &EnrichmentTarget,
        body: &T,
        query: QueryParams,
    ) -> Result<Self, EnrichmentError> {
        let payload = serde_json::to_vec(body).map_err(|e| EnrichmentError::RequestSetupError {
            service: target.description.clone(),
            reason: format!("failed to serialize payload: {e}"),
        })?;

        Ok(Self {
            url: with_query(&target.endpoint, &query),
            query,
            payload,
        })
    }

    /// Parcel identifier carried inside the payload, if it is a single feature
    pub fn identifier(&self) -> Option<Identifier> {
        let body: Value = serde_json::from_slice(&self.payload).ok()?;
        body.get("_id")?.as_str().map(str::to_string)
    }
}

fn with_query(endpoint: &Url, query: &QueryParams) -> Url {
    let mut url = endpoint.clone();
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    url
}
