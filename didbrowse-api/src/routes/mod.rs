//! REST API Routes Module
//!
//! - `/did` attached-files lookup
//! - `/instances` configured remote instances
//! - `/health/*` health checks
//! - `/metrics` Prometheus scrape endpoint

pub mod did;
pub mod health;
pub mod instances;

use axum::{middleware::from_fn, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use did::create_router as did_router;
pub use health::create_router as health_router;
pub use instances::create_router as instances_router;

/// Build the full application router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .nest("/did", did_router())
        .nest("/instances", instances_router())
        .nest("/health", health_router())
        .route("/metrics", get(metrics_handler))
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
