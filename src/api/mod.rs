//! REST API for the enrichment orchestrator
//!
//! ## Endpoints
//!
//! | Endpoint            | Method | Description                               |
//! |---------------------|--------|-------------------------------------------|
//! | `{prefix}:target`   | POST   | Enrich a JSON array of parcel identifiers |
//! | `{prefix}healthz`   | GET    | 200 when the geometry store is readable   |

pub mod routes;

pub use routes::{create_router, AppState};
