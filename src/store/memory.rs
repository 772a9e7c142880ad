//! Map-backed geometry store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{GeometryStore, StoreError};
use crate::parcel::{GeometryRecord, Identifier};

/// In-process store, useful for local runs and tests.
///
/// Can be flipped into an unavailable state to simulate an outage.
#[derive(Debug)]
pub struct InMemoryGeometryStore {
    records: RwLock<HashMap<Identifier, GeometryRecord>>,
    available: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryGeometryStore {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: impl IntoIterator<Item = GeometryRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(records),
            available: AtomicBool::new(true),
            lookups: AtomicUsize::new(0),
        }
    }

    pub async fn insert(&self, record: GeometryRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of `find_by_ids` calls received so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryGeometryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeometryStore for InMemoryGeometryStore {
    async fn find_by_ids(&self, ids: &[Identifier]) -> Result<Vec<GeometryRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("in-memory store marked unavailable".into()));
        }

        let records = self.records.read().await;
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn probe(&self) -> bool {
        self.available.load(Ordering::SeqCst) && !self.records.read().await.is_empty()
    }
}
