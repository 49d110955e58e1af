//! Health facility map.
//!
//! Facilities share the located-record model with doctors; the facility
//! type is the category tag and is normalized on write.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/healthmap` | Register a facility |
//! | GET | `/api/healthmap` | List facilities (type, district, division, active) |
//! | POST | `/api/healthmap/nearest` | Nearest active facilities to a point |
//! | GET | `/api/healthmap/{id}` | Get a facility |
//! | PUT | `/api/healthmap/{id}` | Update a facility |
//! | DELETE | `/api/healthmap/{id}` | Deactivate a facility |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::FacilityService;
