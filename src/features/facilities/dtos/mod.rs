mod facility_dto;

pub use facility_dto::{
    AccessibilityDto, CreateFacilityDto, FacilityContactDto, FacilityResponseDto,
    FacilitySummaryDto, ListFacilitiesQuery, NearestFacilitiesDto, UpdateFacilityDto,
};
