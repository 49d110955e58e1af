use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::facilities::dtos::{
    CreateFacilityDto, FacilityResponseDto, ListFacilitiesQuery, NearestFacilitiesDto,
    UpdateFacilityDto,
};
use crate::features::facilities::services::FacilityService;
use crate::features::locations::dtos::NearestResponseDto;
use crate::shared::types::{ApiResponse, Meta};

/// Register a health facility
///
/// The `type` field is normalized (e.g. "Health Post" becomes `community_clinic`).
#[utoipa::path(
    post,
    path = "/api/healthmap",
    request_body = CreateFacilityDto,
    responses(
        (status = 201, description = "Facility created", body = ApiResponse<FacilityResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "healthmap"
)]
pub async fn create_facility(
    State(service): State<Arc<FacilityService>>,
    AppJson(dto): AppJson<CreateFacilityDto>,
) -> Result<(StatusCode, Json<ApiResponse<FacilityResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let facility = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(facility),
            Some("Facility created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/healthmap",
    params(ListFacilitiesQuery),
    responses(
        (status = 200, description = "List of facilities", body = ApiResponse<Vec<FacilityResponseDto>>),
    ),
    tag = "healthmap"
)]
pub async fn list_facilities(
    State(service): State<Arc<FacilityService>>,
    Query(query): Query<ListFacilitiesQuery>,
) -> Result<Json<ApiResponse<Vec<FacilityResponseDto>>>> {
    let (facilities, total) = service.list(query).await?;
    Ok(Json(ApiResponse::success(
        Some(facilities),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/healthmap/{id}",
    params(
        ("id" = Uuid, Path, description = "Facility ID")
    ),
    responses(
        (status = 200, description = "Facility found", body = ApiResponse<FacilityResponseDto>),
        (status = 404, description = "Facility not found")
    ),
    tag = "healthmap"
)]
pub async fn get_facility(
    State(service): State<Arc<FacilityService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FacilityResponseDto>>> {
    let facility = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(facility), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/healthmap/{id}",
    params(
        ("id" = Uuid, Path, description = "Facility ID")
    ),
    request_body = UpdateFacilityDto,
    responses(
        (status = 200, description = "Facility updated", body = ApiResponse<FacilityResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Facility not found")
    ),
    tag = "healthmap"
)]
pub async fn update_facility(
    State(service): State<Arc<FacilityService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateFacilityDto>,
) -> Result<Json<ApiResponse<FacilityResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let facility = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(facility),
        Some("Facility updated successfully".to_string()),
        None,
    )))
}

/// Deactivate a facility (soft delete)
#[utoipa::path(
    delete,
    path = "/api/healthmap/{id}",
    params(
        ("id" = Uuid, Path, description = "Facility ID")
    ),
    responses(
        (status = 200, description = "Facility deactivated", body = ApiResponse<FacilityResponseDto>),
        (status = 404, description = "Facility not found")
    ),
    tag = "healthmap"
)]
pub async fn delete_facility(
    State(service): State<Arc<FacilityService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FacilityResponseDto>>> {
    let facility = service.deactivate(id).await?;
    Ok(Json(ApiResponse::success(
        Some(facility),
        Some("Facility deactivated successfully".to_string()),
        None,
    )))
}

/// Find the nearest active health facilities to a point
#[utoipa::path(
    post,
    path = "/api/healthmap/nearest",
    request_body = NearestFacilitiesDto,
    responses(
        (status = 200, description = "Nearest facilities", body = ApiResponse<NearestResponseDto<FacilityResponseDto>>),
        (status = 400, description = "Invalid location or options"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "healthmap"
)]
pub async fn nearest_facilities(
    State(service): State<Arc<FacilityService>>,
    AppJson(dto): AppJson<NearestFacilitiesDto>,
) -> Result<Json<ApiResponse<NearestResponseDto<FacilityResponseDto>>>> {
    let nearest = service.nearest(dto).await?;
    Ok(Json(ApiResponse::success(Some(nearest), None, None)))
}
