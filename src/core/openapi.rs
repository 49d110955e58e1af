use utoipa::{Modify, OpenApi};

use crate::features::doctors::{
    dtos as doctors_dtos, handlers as doctors_handlers, models as doctors_models,
};
use crate::features::facilities::{
    dtos as facilities_dtos, handlers as facilities_handlers, models as facilities_models,
};
use crate::features::health::{dtos as health_dtos, handlers as health_handlers};
use crate::features::locations::{dtos as locations_dtos, models as locations_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Doctors
        doctors_handlers::create_doctor,
        doctors_handlers::list_doctors,
        doctors_handlers::get_doctor,
        doctors_handlers::update_doctor,
        doctors_handlers::delete_doctor,
        doctors_handlers::nearest_doctors,
        // Health facilities
        facilities_handlers::create_facility,
        facilities_handlers::list_facilities,
        facilities_handlers::get_facility,
        facilities_handlers::update_facility,
        facilities_handlers::delete_facility,
        facilities_handlers::nearest_facilities,
        // Health
        health_handlers::health_report,
        health_handlers::liveness,
        health_handlers::readiness,
        health_handlers::info,
    ),
    components(
        schemas(
            // Shared
            Meta,
            locations_models::GeoJsonPoint,
            locations_dtos::LocationInputDto,
            // Doctors
            doctors_models::DoctorProfile,
            doctors_models::DoctorAddress,
            doctors_models::DoctorContact,
            doctors_models::Availability,
            doctors_models::OpeningHours,
            doctors_dtos::CreateDoctorDto,
            doctors_dtos::UpdateDoctorDto,
            doctors_dtos::DoctorAddressDto,
            doctors_dtos::DoctorContactDto,
            doctors_dtos::AvailabilityDto,
            doctors_dtos::OpeningHoursDto,
            doctors_dtos::NearestDoctorsDto,
            doctors_dtos::DoctorResponseDto,
            doctors_dtos::DoctorDetailDto,
            doctors_dtos::DoctorListItemDto,
            ApiResponse<doctors_dtos::DoctorResponseDto>,
            ApiResponse<Vec<doctors_dtos::DoctorListItemDto>>,
            ApiResponse<doctors_dtos::DoctorDetailDto>,
            ApiResponse<locations_dtos::NearestResponseDto<doctors_dtos::DoctorListItemDto>>,
            // Health facilities
            facilities_models::FacilityType,
            facilities_models::FacilityProfile,
            facilities_models::FacilityContact,
            facilities_models::Accessibility,
            facilities_dtos::CreateFacilityDto,
            facilities_dtos::UpdateFacilityDto,
            facilities_dtos::FacilityContactDto,
            facilities_dtos::AccessibilityDto,
            facilities_dtos::NearestFacilitiesDto,
            facilities_dtos::FacilityResponseDto,
            facilities_dtos::FacilitySummaryDto,
            ApiResponse<facilities_dtos::FacilityResponseDto>,
            ApiResponse<Vec<facilities_dtos::FacilityResponseDto>>,
            ApiResponse<locations_dtos::NearestResponseDto<facilities_dtos::FacilityResponseDto>>,
            // Health
            health_dtos::LivenessDto,
            health_dtos::ReadinessDto,
            health_dtos::CheckDto,
            health_dtos::HealthChecksDto,
            health_dtos::HealthReportDto,
            health_dtos::InfoDto,
            ApiResponse<health_dtos::LivenessDto>,
            ApiResponse<health_dtos::ReadinessDto>,
            ApiResponse<health_dtos::HealthReportDto>,
            ApiResponse<health_dtos::InfoDto>,
        )
    ),
    tags(
        (name = "doctors", description = "Doctor directory and nearest-doctor search"),
        (name = "healthmap", description = "Health facility map and nearest-facility search"),
        (name = "health", description = "Health, liveness, readiness and info probes"),
    ),
    info(
        title = "Prescrip API",
        version = "0.1.0",
        description = "Doctor and health facility directory API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
