//! Resolution of a parcel batch against the geometry store

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, warn};

use super::GeometryStore;
use crate::error::EnrichmentError;
use crate::parcel::{GeometryRecord, Identifier, ParcelBatch};

/// Look up every identifier of the batch, all or nothing.
///
/// The store is queried once with the distinct identifiers. On success the
/// records come back in request order, one per requested identifier, so a
/// duplicated identifier yields a duplicated record.
pub async fn resolve_geometries(
    store: &dyn GeometryStore,
    batch: &ParcelBatch,
) -> Result<Vec<GeometryRecord>, EnrichmentError> {
    let requested = batch.unique_ids();

    let found = store.find_by_ids(&requested).await.map_err(|e| {
        error!(error = %e, parcel_count = requested.len(), "Geometry lookup failed");
        EnrichmentError::StoreUnavailable(e)
    })?;

    let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();
    let mut by_id: HashMap<Identifier, GeometryRecord> = HashMap::with_capacity(found.len());
    for record in found {
        if record.id.is_empty() || !wanted.contains(record.id.as_str()) {
            warn!(id = %record.id, "Store returned a record that was not requested, ignoring");
            continue;
        }
        by_id.entry(record.id.clone()).or_insert(record);
    }

    let missing = missing_identifiers(&requested, |id| by_id.contains_key(id));
    if !missing.is_empty() {
        debug!(?missing, "Parcels not found in geometry store");
        return Err(EnrichmentError::PartialLookupFailure { missing });
    }

    // every requested id is present past this point
    Ok(batch
        .ids()
        .iter()
        .filter_map(|id| by_id.get(id).cloned())
        .collect())
}

/// `requested - found`, in the order of `requested`
pub fn missing_identifiers<F>(requested: &[Identifier], is_found: F) -> Vec<Identifier>
where
    F: Fn(&str) -> bool,
{
    requested
        .iter()
        .filter(|id| !is_found(id.as_str()))
        .cloned()
        .collect()
}
