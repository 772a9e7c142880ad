//! Geometry store port and adapters
//!
//! The core only issues read-only membership queries against the store.
//! Connection lifecycle (pooling, reconnects) belongs to the adapter.

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;
pub mod resolver;

use async_trait::async_trait;
use thiserror::Error;

use crate::parcel::{GeometryRecord, Identifier};

pub use memory::InMemoryGeometryStore;
#[cfg(feature = "database")]
pub use postgres::PgGeometryStore;
pub use resolver::resolve_geometries;

/// Infrastructure failure of the geometry store, distinct from absent data
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("malformed record '{id}': {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("invalid table name '{0}'")]
    InvalidTable(String),
}

#[async_trait]
pub trait GeometryStore: Send + Sync {
    /// Fetch the records whose id is in `ids`. Absent ids are simply not
    /// returned; order of the result is unspecified.
    async fn find_by_ids(&self, ids: &[Identifier]) -> Result<Vec<GeometryRecord>, StoreError>;

    /// Ready when connected and at least one record can be read
    async fn probe(&self) -> bool;
}
