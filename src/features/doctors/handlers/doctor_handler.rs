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
use crate::features::doctors::dtos::{
    CreateDoctorDto, DoctorDetailDto, DoctorListItemDto, DoctorResponseDto, ListDoctorsQuery,
    NearestDoctorsDto, UpdateDoctorDto,
};
use crate::features::doctors::services::DoctorService;
use crate::features::locations::dtos::NearestResponseDto;
use crate::shared::types::{ApiResponse, Meta};

/// Register a doctor
#[utoipa::path(
    post,
    path = "/api/doctors",
    request_body = CreateDoctorDto,
    responses(
        (status = 201, description = "Doctor created", body = ApiResponse<DoctorResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "doctors"
)]
pub async fn create_doctor(
    State(service): State<Arc<DoctorService>>,
    AppJson(dto): AppJson<CreateDoctorDto>,
) -> Result<(StatusCode, Json<ApiResponse<DoctorResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let doctor = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(doctor),
            Some("Doctor created successfully".to_string()),
            None,
        )),
    ))
}

/// List doctors
///
/// Only active doctors are returned unless `active=false` is given.
#[utoipa::path(
    get,
    path = "/api/doctors",
    params(ListDoctorsQuery),
    responses(
        (status = 200, description = "List of doctors", body = ApiResponse<Vec<DoctorListItemDto>>),
    ),
    tag = "doctors"
)]
pub async fn list_doctors(
    State(service): State<Arc<DoctorService>>,
    Query(query): Query<ListDoctorsQuery>,
) -> Result<Json<ApiResponse<Vec<DoctorListItemDto>>>> {
    let (doctors, total) = service.list(query).await?;
    Ok(Json(ApiResponse::success(
        Some(doctors),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    responses(
        (status = 200, description = "Doctor found", body = ApiResponse<DoctorDetailDto>),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors"
)]
pub async fn get_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DoctorDetailDto>>> {
    let doctor = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(doctor), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/doctors/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    request_body = UpdateDoctorDto,
    responses(
        (status = 200, description = "Doctor updated", body = ApiResponse<DoctorResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors"
)]
pub async fn update_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateDoctorDto>,
) -> Result<Json<ApiResponse<DoctorResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let doctor = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(doctor),
        Some("Doctor updated successfully".to_string()),
        None,
    )))
}

/// Deactivate a doctor (soft delete)
#[utoipa::path(
    delete,
    path = "/api/doctors/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    responses(
        (status = 200, description = "Doctor deactivated", body = ApiResponse<DoctorResponseDto>),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors"
)]
pub async fn delete_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DoctorResponseDto>>> {
    let doctor = service.deactivate(id).await?;
    Ok(Json(ApiResponse::success(
        Some(doctor),
        Some("Doctor deactivated successfully".to_string()),
        None,
    )))
}

/// Find the nearest active doctors to a point
///
/// Results are ordered by great-circle distance, nearest first. The
/// speciality filter is exact and case-sensitive and is applied before the
/// limit.
#[utoipa::path(
    post,
    path = "/api/doctors/nearest",
    request_body = NearestDoctorsDto,
    responses(
        (status = 200, description = "Nearest doctors", body = ApiResponse<NearestResponseDto<DoctorListItemDto>>),
        (status = 400, description = "Invalid location or options"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "doctors"
)]
pub async fn nearest_doctors(
    State(service): State<Arc<DoctorService>>,
    AppJson(dto): AppJson<NearestDoctorsDto>,
) -> Result<Json<ApiResponse<NearestResponseDto<DoctorListItemDto>>>> {
    let nearest = service.nearest(dto).await?;
    Ok(Json(ApiResponse::success(Some(nearest), None, None)))
}
