//! Postgres-backed geometry store
//!
//! Expects one row per parcel: `id TEXT PRIMARY KEY, feature JSONB`, where
//! `feature` is the parcel's GeoJSON Feature. The row id wins over any `_id`
//! member stored inside the feature.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::{info, warn};

use super::{GeometryStore, StoreError};
use crate::config::StoreConfig;
use crate::parcel::{GeometryRecord, Identifier};

pub struct PgGeometryStore {
    pool: PgPool,
    table: String,
}

impl PgGeometryStore {
    pub fn new(pool: PgPool, table: &str) -> Result<Self, StoreError> {
        Ok(Self {
            pool,
            table: quote_identifier(table)?,
        })
    }

    /// Open a connection pool according to `config`
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        info!(
            table = %config.table,
            max_connections = config.max_connections,
            "Connecting to geometry store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to geometry store: {}", e);
                StoreError::from(e)
            })?;

        Self::new(pool, &config.table)
    }
}

#[async_trait]
impl GeometryStore for PgGeometryStore {
    async fn find_by_ids(&self, ids: &[Identifier]) -> Result<Vec<GeometryRecord>, StoreError> {
        let sql = format!("SELECT id, feature FROM {} WHERE id = ANY($1)", self.table);

        let rows: Vec<(String, Json<Value>)> = sqlx::query_as(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(id, Json(feature))| record_from_row(id, feature))
            .collect()
    }

    async fn probe(&self) -> bool {
        if self.pool.is_closed() {
            return false;
        }

        let sql = format!("SELECT id FROM {} LIMIT 1", self.table);
        match sqlx::query_scalar::<_, String>(&sql)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(row) => row.is_some(),
            Err(e) => {
                warn!("Geometry store probe failed: {}", e);
                false
            }
        }
    }
}

fn record_from_row(id: String, feature: Value) -> Result<GeometryRecord, StoreError> {
    let Value::Object(mut members) = feature else {
        return Err(StoreError::MalformedRecord {
            id,
            reason: "feature is not a JSON object".into(),
        });
    };
    members.insert("_id".to_string(), Value::String(id.clone()));

    serde_json::from_value(Value::Object(members)).map_err(|e| StoreError::MalformedRecord {
        id,
        reason: e.to_string(),
    })
}

/// Quote a possibly schema-qualified table name
fn quote_identifier(name: &str) -> Result<String, StoreError> {
    let parts: Vec<&str> = name.split('.').collect();
    let valid = parts.iter().all(|p| {
        !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    });
    if !valid || parts.len() > 2 {
        return Err(StoreError::InvalidTable(name.to_string()));
    }

    Ok(parts
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join("."))
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => StoreError::Connection(error.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}
