use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::facilities::handlers;
use crate::features::facilities::services::FacilityService;

/// Create routes for the health facility map
pub fn routes(service: Arc<FacilityService>) -> Router {
    Router::new()
        .route(
            "/api/healthmap",
            post(handlers::create_facility).get(handlers::list_facilities),
        )
        .route("/api/healthmap/nearest", post(handlers::nearest_facilities))
        .route(
            "/api/healthmap/{id}",
            get(handlers::get_facility)
                .put(handlers::update_facility)
                .delete(handlers::delete_facility),
        )
        .with_state(service)
}
