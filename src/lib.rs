//! Parcel enrichment orchestrator
//!
//! Resolves a client-supplied list of parcel identifiers against the LPIS
//! geometry store, fans the geometries out to an enrichment service
//! (parcel statistics, SOC, hydrology, Natura 2000, topsoil) and returns the
//! correlated results, or a precise failure.
//!
//! The core is store- and transport-agnostic: [`store::GeometryStore`] and
//! [`enrichment::EnrichmentTransport`] are the two ports. The `database`
//! feature adds a Postgres store, the `server` feature the axum REST layer.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod parcel;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

pub use config::{AppConfig, DispatchMode, EnrichmentTarget};
pub use error::{EnrichmentError, FailureKind};
pub use orchestrator::EnrichmentOrchestrator;
pub use outcome::{Enrichment, EnrichmentOutcome};
pub use parcel::{FeatureCollection, GeometryRecord, Identifier};
