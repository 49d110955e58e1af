use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::validation::WHITESPACE_REGEX;

/// Facility classification stored as the record's category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Hospital,
    Clinic,
    CommunityClinic,
    UpazilaHealthComplex,
    UnionHealthCenter,
}

impl FacilityType {
    /// Map a free-text type from imports or clients onto a known type.
    ///
    /// Input is lowercased and whitespace runs become `_` before lookup.
    /// Unrecognized values fall back to `Clinic`.
    pub fn normalize(raw: &str) -> Self {
        let key = WHITESPACE_REGEX
            .replace_all(raw.trim(), "_")
            .to_lowercase();

        match key.as_str() {
            "hospital" => Self::Hospital,
            "community_clinic" | "health_post" | "health_center" => Self::CommunityClinic,
            "upazila_health_complex" => Self::UpazilaHealthComplex,
            "union_health_center" => Self::UnionHealthCenter,
            _ => Self::Clinic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::Clinic => "clinic",
            Self::CommunityClinic => "community_clinic",
            Self::UpazilaHealthComplex => "upazila_health_complex",
            Self::UnionHealthCenter => "union_health_center",
        }
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive fields of a health facility, kept in the attribute document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FacilityProfile {
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upazila: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    pub services: Vec<String>,
    pub contact: FacilityContact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<String>,
    pub accessibility: Accessibility,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FacilityContact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Accessibility {
    pub road_access: bool,
    pub public_transport: bool,
    pub transport_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_notes: Option<String>,
}

impl Default for Accessibility {
    fn default() -> Self {
        Self {
            road_access: true,
            public_transport: false,
            transport_options: Vec::new(),
            accessibility_notes: None,
        }
    }
}
