//! Axum router wiring.
//!
//! Unmatched paths redirect to `/metrics`, like `/`.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::root))
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .route("/exporter/metrics", get(ops::exporter_metrics))
        .fallback(ops::root)
        .layer(middleware::from_fn(ops::log_requests))
        .with_state(state)
}
