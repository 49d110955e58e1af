use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::doctors::models::{
    Availability, DoctorAddress, DoctorContact, DoctorProfile, OpeningHours,
};
use crate::features::facilities::dtos::{FacilityResponseDto, FacilitySummaryDto};
use crate::features::locations::dtos::{LocationInputDto, NearestRequest};
use crate::features::locations::errors::GeoError;
use crate::features::locations::models::{
    from_attributes, GeoJsonPoint, GeoPoint, LocatedEntity, LocationPatch,
};
use crate::shared::types::{double_option, one_or_many};
use crate::shared::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAddressDto {
    #[validate(
        custom(function = "validate_not_blank", message = "Address line1 is required"),
        length(max = 255, message = "Address line1 must not exceed 255 characters")
    )]
    pub line1: String,
    #[validate(length(max = 255, message = "Address line2 must not exceed 255 characters"))]
    pub line2: Option<String>,
    #[validate(length(max = 100, message = "Upazila must not exceed 100 characters"))]
    pub upazila: Option<String>,
    #[validate(length(max = 100, message = "District must not exceed 100 characters"))]
    pub district: Option<String>,
    #[validate(length(max = 100, message = "Division must not exceed 100 characters"))]
    pub division: Option<String>,
}

impl From<DoctorAddressDto> for DoctorAddress {
    fn from(dto: DoctorAddressDto) -> Self {
        Self {
            line1: dto.line1.trim().to_string(),
            line2: dto.line2,
            upazila: dto.upazila,
            district: dto.district,
            division: dto.division,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DoctorContactDto {
    /// A single number or a list of numbers
    #[serde(default, deserialize_with = "one_or_many")]
    pub phone: Vec<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl From<DoctorContactDto> for DoctorContact {
    fn from(dto: DoctorContactDto) -> Self {
        Self {
            phone: dto.phone,
            email: dto.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OpeningHoursDto {
    #[validate(regex(
        path = "*crate::shared::validation::HOUR_MINUTE_REGEX",
        message = "Start time must be HH:MM"
    ))]
    pub start: String,
    #[validate(regex(
        path = "*crate::shared::validation::HOUR_MINUTE_REGEX",
        message = "End time must be HH:MM"
    ))]
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AvailabilityDto {
    #[serde(default)]
    pub days: Vec<String>,
    #[validate(nested)]
    pub hours: Option<OpeningHoursDto>,
}

impl From<AvailabilityDto> for Availability {
    fn from(dto: AvailabilityDto) -> Self {
        Self {
            days: dto.days,
            hours: dto.hours.map(|h| OpeningHours {
                start: h.start,
                end: h.end,
            }),
        }
    }
}

/// Request DTO for registering a doctor
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorDto {
    #[validate(
        custom(function = "validate_not_blank", message = "Name is required"),
        length(max = 255, message = "Name must not exceed 255 characters")
    )]
    pub name: String,

    #[validate(
        custom(function = "validate_not_blank", message = "Speciality is required"),
        length(max = 100, message = "Speciality must not exceed 100 characters")
    )]
    pub speciality: String,

    pub degree: Option<String>,
    pub experience: Option<String>,

    #[validate(length(max = 5000, message = "About must not exceed 5000 characters"))]
    pub about: Option<String>,

    #[validate(range(min = 0.0, message = "Fees must not be negative"))]
    pub fees: Option<f64>,

    pub image: Option<String>,

    #[validate(nested)]
    pub location: LocationInputDto,

    #[validate(nested)]
    pub address: DoctorAddressDto,

    #[validate(nested)]
    pub contact: Option<DoctorContactDto>,

    /// Facility the doctor practises at
    pub facility: Option<Uuid>,

    #[validate(nested)]
    pub availability: Option<AvailabilityDto>,

    #[serde(default)]
    pub verified: bool,
}

impl CreateDoctorDto {
    /// Split into the indexed location and the descriptive profile
    pub fn into_parts(self) -> Result<(GeoPoint, DoctorProfile), GeoError> {
        let point = self.location.to_point()?;
        let profile = DoctorProfile {
            name: self.name.trim().to_string(),
            degree: self.degree,
            experience: self.experience,
            about: self.about,
            fees: self.fees,
            image: self.image,
            address: self.address.into(),
            contact: self.contact.map(Into::into).unwrap_or_default(),
            availability: self.availability.map(Into::into).unwrap_or_default(),
            verified: self.verified,
        };
        Ok((point, profile))
    }
}

/// Request DTO for updating a doctor; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorDto {
    #[validate(
        custom(function = "validate_not_blank", message = "Name must not be blank"),
        length(max = 255, message = "Name must not exceed 255 characters")
    )]
    pub name: Option<String>,

    #[validate(
        custom(function = "validate_not_blank", message = "Speciality must not be blank"),
        length(max = 100, message = "Speciality must not exceed 100 characters")
    )]
    pub speciality: Option<String>,

    pub degree: Option<String>,
    pub experience: Option<String>,

    #[validate(length(max = 5000, message = "About must not exceed 5000 characters"))]
    pub about: Option<String>,

    #[validate(range(min = 0.0, message = "Fees must not be negative"))]
    pub fees: Option<f64>,

    pub image: Option<String>,

    #[validate(nested)]
    pub location: Option<LocationInputDto>,

    #[validate(nested)]
    pub address: Option<DoctorAddressDto>,

    #[validate(nested)]
    pub contact: Option<DoctorContactDto>,

    /// Facility reference; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub facility: Option<Option<Uuid>>,

    #[validate(nested)]
    pub availability: Option<AvailabilityDto>,

    pub verified: Option<bool>,
    pub active: Option<bool>,
}

impl UpdateDoctorDto {
    pub fn into_patch(self) -> Result<LocationPatch, GeoError> {
        let mut patch = LocationPatch {
            location: self.location.map(|l| l.to_point()).transpose()?,
            category: self.speciality.map(|s| s.trim().to_string()),
            active: self.active,
            facility_id: self.facility,
            attributes: None,
        };

        patch.set_attribute("name", self.name.map(|n| n.trim().to_string()))?;
        patch.set_attribute("degree", self.degree)?;
        patch.set_attribute("experience", self.experience)?;
        patch.set_attribute("about", self.about)?;
        patch.set_attribute("fees", self.fees)?;
        patch.set_attribute("image", self.image)?;
        patch.set_attribute("address", self.address.map(DoctorAddress::from))?;
        patch.set_attribute("contact", self.contact.map(DoctorContact::from))?;
        patch.set_attribute("availability", self.availability.map(Availability::from))?;
        patch.set_attribute("verified", self.verified)?;

        Ok(patch)
    }
}

/// Query parameters for listing doctors
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListDoctorsQuery {
    /// Exact speciality match
    pub speciality: Option<String>,
    /// Exact `address.district` match
    pub district: Option<String>,
    pub verified: Option<bool>,
    /// Defaults to true
    pub active: Option<bool>,
    #[param(minimum = 1)]
    pub page: Option<i64>,
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

/// Request DTO for `POST /api/doctors/nearest`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearestDoctorsDto {
    /// `[longitude, latitude]`
    #[schema(example = json!([91.1809, 23.4607]))]
    pub location: Option<Vec<f64>>,
    /// Search radius in meters (default 10000)
    pub max_distance: Option<f64>,
    /// Maximum number of results (default 10)
    pub limit: Option<f64>,
    /// Exact, case-sensitive speciality filter
    pub speciality: Option<String>,
}

impl From<NearestDoctorsDto> for NearestRequest {
    fn from(dto: NearestDoctorsDto) -> Self {
        Self {
            location: dto.location,
            max_distance: dto.max_distance,
            limit: dto.limit,
            category: dto.speciality,
        }
    }
}

/// Response DTO for a doctor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponseDto {
    pub id: Uuid,
    pub speciality: String,
    #[schema(value_type = GeoJsonPoint)]
    pub location: GeoPoint,
    #[serde(flatten)]
    pub profile: DoctorProfile,
    pub facility_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocatedEntity> for DoctorResponseDto {
    fn from(entity: LocatedEntity) -> Self {
        Self {
            id: entity.id,
            speciality: entity.category,
            location: entity.location,
            profile: from_attributes(entity.id, entity.attributes),
            facility_id: entity.facility_id,
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Doctor with the referenced facility resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorDetailDto {
    #[serde(flatten)]
    pub doctor: DoctorResponseDto,
    /// `null` when no facility is referenced or the reference is dangling
    pub facility: Option<FacilityResponseDto>,
}

/// Doctor as returned by listings and nearest searches, carrying a short
/// summary of the referenced facility
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorListItemDto {
    #[serde(flatten)]
    pub doctor: DoctorResponseDto,
    /// `null` when no facility is referenced or the reference is dangling
    pub facility: Option<FacilitySummaryDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::locations::models::Collection;
    use crate::shared::test_helpers::profile;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "name": "Dr. Farhana Akter",
            "speciality": "gynecologist",
            "degree": "MBBS, FCPS",
            "fees": 800,
            "location": { "coordinates": [91.1809, 23.4607] },
            "address": { "line1": "Jhautola Road", "district": "Cumilla" },
            "contact": { "phone": "01711000000" }
        })
    }

    #[test]
    fn test_create_dto_valid() {
        let dto: CreateDoctorDto = serde_json::from_value(create_body()).unwrap();
        assert!(dto.validate().is_ok());

        let (point, profile) = dto.into_parts().unwrap();
        assert_eq!(point.coordinates(), [91.1809, 23.4607]);
        assert_eq!(profile.contact.phone, vec!["01711000000"]);
        assert_eq!(profile.address.district.as_deref(), Some("Cumilla"));
        assert!(!profile.verified);
    }

    #[test]
    fn test_create_dto_rejects_negative_fees_and_blank_line1() {
        let mut body = create_body();
        body["fees"] = json!(-1);
        body["address"]["line1"] = json!("  ");
        let dto: CreateDoctorDto = serde_json::from_value(body).unwrap();

        let errors = dto.validate().unwrap_err();
        assert!(errors.errors().contains_key("fees"));
        assert!(errors.errors().contains_key("address"));
        assert!(errors.to_string().contains("Fees must not be negative"));
    }

    #[test]
    fn test_create_dto_rejects_bad_location() {
        let mut body = create_body();
        body["location"]["coordinates"] = json!([91.1809]);
        let dto: CreateDoctorDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_opening_hours_format() {
        let mut body = create_body();
        body["availability"] = json!({ "days": ["Sat"], "hours": { "start": "9:00", "end": "17:00" } });
        let dto: CreateDoctorDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_dto_into_patch() {
        let dto: UpdateDoctorDto = serde_json::from_value(json!({
            "fees": 1000,
            "facility": null,
            "location": { "coordinates": [90.4125, 23.8103] }
        }))
        .unwrap();

        let patch = dto.into_patch().unwrap();
        assert_eq!(patch.facility_id, Some(None));
        assert_eq!(patch.location.unwrap().coordinates(), [90.4125, 23.8103]);
        assert_eq!(patch.attributes.unwrap().get("fees"), Some(&json!(1000.0)));
        assert_eq!(patch.category, None);
    }

    #[test]
    fn test_response_survives_malformed_fees() {
        let entity = LocatedEntity::new(
            Collection::Doctor,
            GeoPoint::new(91.1809, 23.4607).unwrap(),
            "cardiologist",
            profile(json!({
                "name": "Dr. Imported",
                "fees": "500",
                "address": { "line1": "Kandirpar", "district": "Cumilla" }
            })),
        );

        let dto = DoctorResponseDto::from(entity);
        assert_eq!(dto.profile.name, "Dr. Imported");
        assert_eq!(dto.profile.fees, None);
        assert_eq!(dto.profile.address.district.as_deref(), Some("Cumilla"));
    }

    #[test]
    fn test_empty_update_is_empty_patch() {
        let patch = UpdateDoctorDto::default().into_patch().unwrap();
        assert!(patch.is_empty());
    }
}
