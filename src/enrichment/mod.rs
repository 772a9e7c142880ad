//! Enrichment fan-out
//!
//! This module provides:
//! - Outbound request construction for batch and per-item targets
//! - The transport port and its reqwest adapter
//! - Concurrent dispatch with all-or-nothing aggregation
//! - Correlation of per-item replies back to their parcel
//! - Classification of failed calls

pub mod classifier;
pub mod correlator;
pub mod dispatcher;
pub mod http;
pub mod request;
pub mod transport;

pub use classifier::classify;
pub use correlator::{correlate, EnrichmentResult};
pub use dispatcher::{EnrichmentDispatcher, SettledCall};
pub use http::HttpTransport;
pub use request::{EnrichmentRequest, QueryParams};
pub use transport::{EnrichmentTransport, TransportFailure, UpstreamReply};
