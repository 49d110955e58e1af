mod doctor;

pub use doctor::{Availability, DoctorAddress, DoctorContact, DoctorProfile, OpeningHours};
