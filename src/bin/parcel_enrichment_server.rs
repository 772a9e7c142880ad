//! Parcel enrichment REST server
//!
//! Reads config from env vars (a `.env` file is honoured):
//!   DATABASE_URL: Postgres holding the LPIS parcels
//!   LPIS_TABLE: parcel table (default: lpis)
//!   BIND_ADDR: listen address (default: 0.0.0.0:3000)
//!   FRONTEND_URL_PREFIX: route prefix (default: /)
//!   ENRICHMENT_TIMEOUT_SECS: outbound call timeout (default: 30)
//!   <SERVICE>_INFO_SERVICE_HOST / _PORT for each enrichment service
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/fast cargo run --bin parcel_enrichment_server
//!
//! curl -X POST http://localhost:3000/soc \
//!   -H "Content-Type: application/json" \
//!   -d '["FR-0001", "FR-0002"]'
//!
//! curl -X POST "http://localhost:3000/hydro?distance=500" \
//!   -H "Content-Type: application/json" \
//!   -d '["FR-0001"]'
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use parcel_enrichment::api::create_router;
use parcel_enrichment::enrichment::HttpTransport;
use parcel_enrichment::store::PgGeometryStore;
use parcel_enrichment::{AppConfig, EnrichmentOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,parcel_enrichment=debug".into()),
        )
        .init();

    let config = Arc::new(AppConfig::from_env().context("Invalid configuration")?);
    for target in &config.targets {
        info!(
            target_name = %target.name,
            endpoint = %target.endpoint,
            mode = ?target.mode,
            "Enrichment target configured"
        );
    }

    let store = PgGeometryStore::connect(&config.store)
        .await
        .context("Failed to connect to geometry store")?;
    info!("Connected to geometry store");

    let transport = HttpTransport::new(config.request_timeout)?;

    let orchestrator = Arc::new(EnrichmentOrchestrator::new(
        Arc::clone(&config),
        Arc::new(store),
        Arc::new(transport),
    ));

    let app = create_router(orchestrator).layer(
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
    );

    let listener = TcpListener::bind(&config.http.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.http.bind_addr))?;
    info!(
        "parcel enrichment server listening on {}{}",
        config.http.bind_addr, config.http.url_prefix
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
