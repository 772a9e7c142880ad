//! Enrichment routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::warn;

use crate::enrichment::QueryParams;
use crate::error::EnrichmentError;
use crate::orchestrator::EnrichmentOrchestrator;
use crate::outcome::EnrichmentOutcome;
use crate::parcel::Identifier;

/// Shared state for the enrichment routes
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<EnrichmentOrchestrator>,
}

/// Build the router, mounted under the configured URL prefix
pub fn create_router(orchestrator: Arc<EnrichmentOrchestrator>) -> Router {
    let prefix = orchestrator.config().http.url_prefix.clone();
    let state = AppState { orchestrator };

    let routes = Router::new()
        .route("/healthz", get(health_check))
        .route("/:target", post(enrich_parcels))
        .with_state(state);

    match prefix.trim_end_matches('/') {
        "" => routes,
        mount => Router::new().nest(mount, routes),
    }
}

async fn enrich_parcels(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Query(query): Query<QueryParams>,
    body: Result<Json<Vec<Identifier>>, JsonRejection>,
) -> Response {
    let Json(ids) = match body {
        Ok(ids) => ids,
        Err(rejection) => {
            warn!(
                target_name = %target,
                reason = %rejection.body_text(),
                "Rejected enrichment request body"
            );
            return EnrichmentError::MalformedRequest {
                status: rejection.status().as_u16(),
                reason: rejection.body_text(),
            }
            .into_response();
        }
    };

    match state.orchestrator.enrich(&target, ids, query).await {
        Ok(items) => (
            StatusCode::OK,
            Json(EnrichmentOutcome::success(target, items)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health_check(State(state): State<AppState>) -> StatusCode {
    if state.orchestrator.is_ready().await {
        StatusCode::OK
    } else {
        warn!("Health check failed: geometry store not ready");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for EnrichmentError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(EnrichmentOutcome::from(&self))).into_response()
    }
}
