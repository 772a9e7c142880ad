//! Concurrent dispatch of enrichment calls
//!
//! Per-item dispatch issues every call at once and waits for all of them to
//! settle before looking at any outcome. A single failed call fails the whole
//! dispatch; the first failure in completion order is the one reported. Calls
//! already in flight are never cancelled.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::debug;

use super::classifier::classify;
use super::request::{EnrichmentRequest, QueryParams};
use super::transport::{EnrichmentTransport, UpstreamReply};
use crate::config::EnrichmentTarget;
use crate::error::EnrichmentError;
use crate::parcel::{FeatureCollection, GeometryRecord};

/// A per-item call that completed with a 2xx reply
#[derive(Debug, Clone)]
pub struct SettledCall {
    pub request: EnrichmentRequest,
    pub reply: UpstreamReply,
}

pub struct EnrichmentDispatcher {
    transport: Arc<dyn EnrichmentTransport>,
}

impl EnrichmentDispatcher {
    pub fn new(transport: Arc<dyn EnrichmentTransport>) -> Self {
        Self { transport }
    }

    /// One call carrying the whole resolved set as a FeatureCollection
    pub async fn dispatch_batch(
        &self,
        target: &EnrichmentTarget,
        records: Vec<GeometryRecord>,
    ) -> Result<UpstreamReply, EnrichmentError> {
        let collection = FeatureCollection::new(records);
        let request = EnrichmentRequest::for_collection(target, &collection)?;

        debug!(
            target_name = %target.name,
            parcel_count = collection.features.len(),
            "Dispatching batch enrichment call"
        );
        let outcome = self.transport.post(&request).await;
        classify(target, outcome)
    }

    /// One concurrent call per record, joined.
    ///
    /// Returned calls are in completion order, not submission order.
    pub async fn dispatch_per_item(
        &self,
        target: &EnrichmentTarget,
        records: &[GeometryRecord],
        query: &QueryParams,
    ) -> Result<Vec<SettledCall>, EnrichmentError> {
        // build everything up front so a setup failure sends nothing
        let requests = records
            .iter()
            .map(|record| EnrichmentRequest::for_record(target, record, query))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            target_name = %target.name,
            call_count = requests.len(),
            "Dispatching per-item enrichment calls"
        );

        let transport = self.transport.as_ref();
        let settled: Vec<_> = requests
            .into_iter()
            .map(move |request| async move {
                let outcome = transport.post(&request).await;
                (request, outcome)
            })
            .collect::<FuturesUnordered<_>>()
            .collect()
            .await;

        let mut calls = Vec::with_capacity(settled.len());
        let mut first_failure = None;
        for (request, outcome) in settled {
            match classify(target, outcome) {
                Ok(reply) => calls.push(SettledCall { request, reply }),
                Err(e) => {
                    first_failure.get_or_insert(e);
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(calls),
        }
    }
}
