use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::core::error::Result;
use crate::features::health::dtos::{HealthReportDto, InfoDto, LivenessDto, ReadinessDto};
use crate::features::health::services::HealthService;
use crate::shared::types::ApiResponse;

/// Aggregate health of the service and its store
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "All checks passed", body = ApiResponse<HealthReportDto>),
        (status = 503, description = "At least one check failed", body = ApiResponse<HealthReportDto>)
    ),
    tag = "health"
)]
pub async fn health_report(
    State(service): State<Arc<HealthService>>,
) -> (StatusCode, Json<ApiResponse<HealthReportDto>>) {
    let report = service.report().await;
    let healthy = report.is_healthy();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse {
            success: healthy,
            data: Some(report),
            message: None,
            meta: None,
            errors: None,
        }),
    )
}

/// Process is up and serving requests
#[utoipa::path(
    get,
    path = "/api/health/live",
    responses(
        (status = 200, description = "Service is alive", body = ApiResponse<LivenessDto>),
    ),
    tag = "health"
)]
pub async fn liveness(
    State(service): State<Arc<HealthService>>,
) -> Json<ApiResponse<LivenessDto>> {
    Json(ApiResponse::success(Some(service.liveness()), None, None))
}

/// Storage is reachable
#[utoipa::path(
    get,
    path = "/api/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ApiResponse<ReadinessDto>),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "health"
)]
pub async fn readiness(
    State(service): State<Arc<HealthService>>,
) -> Result<Json<ApiResponse<ReadinessDto>>> {
    let report = service.readiness().await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Build and process details
#[utoipa::path(
    get,
    path = "/api/health/info",
    responses(
        (status = 200, description = "Service info", body = ApiResponse<InfoDto>),
    ),
    tag = "health"
)]
pub async fn info(State(service): State<Arc<HealthService>>) -> Json<ApiResponse<InfoDto>> {
    Json(ApiResponse::success(Some(service.info()), None, None))
}
