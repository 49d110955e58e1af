mod facility;

pub use facility::{Accessibility, FacilityContact, FacilityProfile, FacilityType};
