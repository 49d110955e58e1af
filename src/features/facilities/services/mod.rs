mod facility_service;

pub use facility_service::FacilityService;
