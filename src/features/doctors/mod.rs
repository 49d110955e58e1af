//! Doctor directory.
//!
//! Doctors are stored as located records in the doctor collection: the
//! speciality is the category tag, everything descriptive (name, address,
//! contact, fees, availability) lives in the attribute document.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/doctors` | Register a doctor |
//! | GET | `/api/doctors` | List doctors (speciality, district, verified, active) |
//! | POST | `/api/doctors/nearest` | Nearest active doctors to a point |
//! | GET | `/api/doctors/{id}` | Get a doctor with its facility |
//! | PUT | `/api/doctors/{id}` | Update a doctor |
//! | DELETE | `/api/doctors/{id}` | Deactivate a doctor |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::DoctorService;
