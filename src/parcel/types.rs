//! GeoJSON shapes exchanged with the geometry store and enrichment services

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque token naming one parcel in the geometry store
pub type Identifier = String;

/// One parcel as stored: a GeoJSON Feature keyed by `_id`.
///
/// Members other than `_id` and `geometry` (`type`, `properties` with the
/// parcel CRS, ...) are kept as-is and forwarded to enrichment services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    #[serde(rename = "_id")]
    pub id: Identifier,
    pub geometry: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeometryRecord {
    pub fn new(id: impl Into<Identifier>, geometry: Value) -> Self {
        let mut extra = Map::new();
        extra.insert("type".to_string(), Value::String("Feature".to_string()));
        Self {
            id: id.into(),
            geometry,
            extra,
        }
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.extra.insert("properties".to_string(), properties);
        self
    }
}

/// Ordered batch of records sent in a single outbound call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<GeometryRecord>,
}

impl FeatureCollection {
    pub fn new(features: Vec<GeometryRecord>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}
