use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::health::handlers;
use crate::features::health::services::HealthService;

/// Aggregate health, liveness, readiness and info probes
pub fn routes(service: Arc<HealthService>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_report))
        .route("/api/health/live", get(handlers::liveness))
        .route("/api/health/ready", get(handlers::readiness))
        .route("/api/health/info", get(handlers::info))
        .with_state(service)
}
