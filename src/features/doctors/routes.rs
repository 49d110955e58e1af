use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::doctors::handlers;
use crate::features::doctors::services::DoctorService;

/// Create routes for the doctors feature
pub fn routes(service: Arc<DoctorService>) -> Router {
    Router::new()
        .route(
            "/api/doctors",
            post(handlers::create_doctor).get(handlers::list_doctors),
        )
        .route("/api/doctors/nearest", post(handlers::nearest_doctors))
        .route(
            "/api/doctors/{id}",
            get(handlers::get_doctor)
                .put(handlers::update_doctor)
                .delete(handlers::delete_doctor),
        )
        .with_state(service)
}
