//! Enrichment orchestration
//!
//! Target lookup → batch validation → geometry resolution → dispatch →
//! correlation. Either the whole run succeeds or it fails with one
//! [`EnrichmentError`]; partial results never leave this module.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{AppConfig, DispatchMode};
use crate::enrichment::{
    correlate, correlator::reply_data, EnrichmentDispatcher, EnrichmentTransport, QueryParams,
};
use crate::error::EnrichmentError;
use crate::outcome::Enrichment;
use crate::parcel::{Identifier, ParcelBatch};
use crate::store::{resolve_geometries, GeometryStore};

pub struct EnrichmentOrchestrator {
    config: Arc<AppConfig>,
    store: Arc<dyn GeometryStore>,
    dispatcher: EnrichmentDispatcher,
}

impl EnrichmentOrchestrator {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn GeometryStore>,
        transport: Arc<dyn EnrichmentTransport>,
    ) -> Self {
        Self {
            config,
            store,
            dispatcher: EnrichmentDispatcher::new(transport),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Enrich `ids` with the service named `target_name`.
    ///
    /// `query` is forwarded to every per-item call of targets that accept it.
    pub async fn enrich(
        &self,
        target_name: &str,
        ids: Vec<Identifier>,
        query: QueryParams,
    ) -> Result<Enrichment, EnrichmentError> {
        let span = info_span!("enrich", run_id = %Uuid::new_v4(), target_name);
        self.run(target_name, ids, query).instrument(span).await
    }

    async fn run(
        &self,
        target_name: &str,
        ids: Vec<Identifier>,
        query: QueryParams,
    ) -> Result<Enrichment, EnrichmentError> {
        let target = self
            .config
            .target(target_name)
            .ok_or_else(|| EnrichmentError::UnknownTarget(target_name.to_string()))?;

        let batch = ParcelBatch::new(ids)?;
        let records = resolve_geometries(self.store.as_ref(), &batch).await?;

        let enrichment = match target.mode {
            DispatchMode::Batch => {
                let reply = self.dispatcher.dispatch_batch(target, records).await?;
                Enrichment::Aggregate(reply_data(&reply.body))
            }
            DispatchMode::PerItem => {
                let calls = self
                    .dispatcher
                    .dispatch_per_item(target, &records, &query)
                    .await?;
                Enrichment::Items(correlate(target, calls)?)
            }
        };

        info!(parcel_count = batch.len(), "Enrichment completed");
        Ok(enrichment)
    }

    /// Readiness of the geometry store
    pub async fn is_ready(&self) -> bool {
        self.store.probe().await
    }
}
