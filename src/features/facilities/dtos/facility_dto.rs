use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::facilities::models::{
    Accessibility, FacilityContact, FacilityProfile, FacilityType,
};
use crate::features::locations::dtos::{LocationInputDto, NearestRequest};
use crate::features::locations::errors::GeoError;
use crate::features::locations::models::{
    from_attributes, GeoJsonPoint, GeoPoint, LocatedEntity, LocationPatch,
};
use crate::shared::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FacilityContactDto {
    #[validate(length(max = 50, message = "Phone must not exceed 50 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl From<FacilityContactDto> for FacilityContact {
    fn from(dto: FacilityContactDto) -> Self {
        Self {
            phone: dto.phone,
            email: dto.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityDto {
    #[serde(default = "default_true")]
    pub road_access: bool,
    #[serde(default)]
    pub public_transport: bool,
    #[serde(default)]
    pub transport_options: Vec<String>,
    #[validate(length(max = 1000, message = "Accessibility notes must not exceed 1000 characters"))]
    pub accessibility_notes: Option<String>,
}

fn default_true() -> bool {
    true
}

impl From<AccessibilityDto> for Accessibility {
    fn from(dto: AccessibilityDto) -> Self {
        Self {
            road_access: dto.road_access,
            public_transport: dto.public_transport,
            transport_options: dto.transport_options,
            accessibility_notes: dto.accessibility_notes,
        }
    }
}

/// Request DTO for registering a health facility
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityDto {
    #[validate(
        custom(function = "validate_not_blank", message = "Name is required"),
        length(max = 255, message = "Name must not exceed 255 characters")
    )]
    pub name: String,

    /// Free-text type, normalized to a known facility type
    #[serde(rename = "type")]
    #[schema(example = "Upazila Health Complex")]
    pub facility_type: String,

    #[validate(nested)]
    pub location: LocationInputDto,

    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub address: Option<String>,
    pub upazila: Option<String>,
    pub district: Option<String>,
    pub division: Option<String>,

    #[serde(default)]
    pub services: Vec<String>,

    #[validate(nested)]
    pub contact: Option<FacilityContactDto>,

    pub operating_hours: Option<String>,

    #[validate(nested)]
    pub accessibility: Option<AccessibilityDto>,

    #[serde(default)]
    pub verified: bool,
}

impl CreateFacilityDto {
    /// Split into location, normalized type and the descriptive profile
    pub fn into_parts(self) -> Result<(GeoPoint, FacilityType, FacilityProfile), GeoError> {
        let point = self.location.to_point()?;
        let facility_type = FacilityType::normalize(&self.facility_type);
        let profile = FacilityProfile {
            name: self.name.trim().to_string(),
            address: self.address.unwrap_or_default(),
            upazila: self.upazila,
            district: self.district,
            division: self.division,
            services: self.services,
            contact: self.contact.map(Into::into).unwrap_or_default(),
            operating_hours: self.operating_hours,
            accessibility: self.accessibility.map(Into::into).unwrap_or_default(),
            verified: self.verified,
        };
        Ok((point, facility_type, profile))
    }
}

/// Request DTO for updating a facility; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacilityDto {
    #[validate(
        custom(function = "validate_not_blank", message = "Name must not be blank"),
        length(max = 255, message = "Name must not exceed 255 characters")
    )]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub facility_type: Option<String>,

    #[validate(nested)]
    pub location: Option<LocationInputDto>,

    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub address: Option<String>,
    pub upazila: Option<String>,
    pub district: Option<String>,
    pub division: Option<String>,
    pub services: Option<Vec<String>>,

    #[validate(nested)]
    pub contact: Option<FacilityContactDto>,

    pub operating_hours: Option<String>,

    #[validate(nested)]
    pub accessibility: Option<AccessibilityDto>,

    pub verified: Option<bool>,
    pub active: Option<bool>,
}

impl UpdateFacilityDto {
    pub fn into_patch(self) -> Result<LocationPatch, GeoError> {
        let mut patch = LocationPatch {
            location: self.location.map(|l| l.to_point()).transpose()?,
            category: self
                .facility_type
                .map(|t| FacilityType::normalize(&t).as_str().to_string()),
            active: self.active,
            facility_id: None,
            attributes: None,
        };

        patch.set_attribute("name", self.name.map(|n| n.trim().to_string()))?;
        patch.set_attribute("address", self.address)?;
        patch.set_attribute("upazila", self.upazila)?;
        patch.set_attribute("district", self.district)?;
        patch.set_attribute("division", self.division)?;
        patch.set_attribute("services", self.services)?;
        patch.set_attribute("contact", self.contact.map(FacilityContact::from))?;
        patch.set_attribute("operatingHours", self.operating_hours)?;
        patch.set_attribute("accessibility", self.accessibility.map(Accessibility::from))?;
        patch.set_attribute("verified", self.verified)?;

        Ok(patch)
    }
}

/// Query parameters for listing facilities
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListFacilitiesQuery {
    /// Exact facility type match
    #[serde(rename = "type")]
    pub facility_type: Option<String>,
    pub district: Option<String>,
    pub division: Option<String>,
    /// Defaults to true
    pub active: Option<bool>,
    #[param(minimum = 1)]
    pub page: Option<i64>,
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

/// Request DTO for `POST /api/healthmap/nearest`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearestFacilitiesDto {
    /// `[longitude, latitude]`
    #[schema(example = json!([91.1809, 23.4607]))]
    pub location: Option<Vec<f64>>,
    /// Search radius in meters (default 10000)
    pub max_distance: Option<f64>,
    /// Maximum number of results (default 10)
    pub limit: Option<f64>,
    /// Exact, case-sensitive facility type filter
    #[serde(rename = "type")]
    pub facility_type: Option<String>,
}

impl From<NearestFacilitiesDto> for NearestRequest {
    fn from(dto: NearestFacilitiesDto) -> Self {
        Self {
            location: dto.location,
            max_distance: dto.max_distance,
            limit: dto.limit,
            category: dto.facility_type,
        }
    }
}

/// Response DTO for a health facility
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityResponseDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub facility_type: String,
    #[schema(value_type = GeoJsonPoint)]
    pub location: GeoPoint,
    #[serde(flatten)]
    pub profile: FacilityProfile,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocatedEntity> for FacilityResponseDto {
    fn from(entity: LocatedEntity) -> Self {
        Self {
            id: entity.id,
            facility_type: entity.category,
            location: entity.location,
            profile: from_attributes(entity.id, entity.attributes),
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Short facility reference embedded in doctor listings and searches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FacilitySummaryDto {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub facility_type: String,
    pub address: String,
}

impl From<FacilityResponseDto> for FacilitySummaryDto {
    fn from(facility: FacilityResponseDto) -> Self {
        Self {
            id: facility.id,
            name: facility.profile.name,
            facility_type: facility.facility_type,
            address: facility.profile.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::locations::models::Collection;
    use crate::shared::test_helpers::profile;
    use serde_json::json;

    #[test]
    fn test_response_keeps_profile_when_one_attribute_is_malformed() {
        let entity = LocatedEntity::new(
            Collection::Facility,
            GeoPoint::new(91.3167, 23.2167).unwrap(),
            "hospital",
            profile(json!({
                "name": "Cumilla Medical College Hospital",
                "address": "Kuchaitoli, Cumilla",
                "services": "emergency"
            })),
        );

        let dto = FacilityResponseDto::from(entity);
        assert_eq!(dto.profile.name, "Cumilla Medical College Hospital");
        assert_eq!(dto.profile.address, "Kuchaitoli, Cumilla");
        assert!(dto.profile.services.is_empty());

        let summary = FacilitySummaryDto::from(dto);
        assert_eq!(summary.facility_type, "hospital");
        assert_eq!(
            serde_json::to_value(&summary).unwrap()["type"],
            json!("hospital")
        );
    }

    #[test]
    fn test_create_dto_normalizes_type() {
        let dto: CreateFacilityDto = serde_json::from_value(json!({
            "name": "Chauddagram Upazila Health Complex",
            "type": "Upazila Health Complex",
            "location": { "coordinates": [91.3167, 23.2167] },
            "district": "Cumilla",
            "services": ["emergency", "maternity"]
        }))
        .unwrap();
        assert!(dto.validate().is_ok());

        let (_, facility_type, profile) = dto.into_parts().unwrap();
        assert_eq!(facility_type, FacilityType::UpazilaHealthComplex);
        assert_eq!(profile.services.len(), 2);
        assert!(profile.accessibility.road_access);
    }

    #[test]
    fn test_update_dto_normalizes_type_and_maps_keys() {
        let dto: UpdateFacilityDto = serde_json::from_value(json!({
            "type": "pharmacy",
            "operatingHours": "24/7"
        }))
        .unwrap();

        let patch = dto.into_patch().unwrap();
        assert_eq!(patch.category.as_deref(), Some("clinic"));
        assert_eq!(
            patch.attributes.unwrap().get("operatingHours"),
            Some(&json!("24/7"))
        );
    }

    #[test]
    fn test_nearest_dto_reads_type_key() {
        let dto: NearestFacilitiesDto = serde_json::from_value(json!({
            "location": [91.18, 23.46],
            "type": "hospital"
        }))
        .unwrap();
        let request = NearestRequest::from(dto);
        assert_eq!(request.category.as_deref(), Some("hospital"));
    }
}
