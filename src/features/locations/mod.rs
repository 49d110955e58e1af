//! Geo-indexed records and the proximity query engine.
//!
//! Doctors and health facilities are both stored as [`models::LocatedEntity`]
//! records: a validated [`models::GeoPoint`], a category tag and opaque
//! attributes. [`services::ProximityService`] answers nearest-record queries
//! on top of any [`services::LocationStore`].
//!
//! ## Query rules
//!
//! - distances are great-circle (Haversine) meters
//! - category and active filters restrict candidates before ranking
//! - results are ordered by distance, then by id, and truncated to `limit`
//! - invalid input fails before storage is touched; storage failures propagate

pub mod dtos;
pub mod errors;
pub mod models;
pub mod services;

pub use errors::GeoError;
pub use services::{InMemoryLocationStore, LocationStore, PgLocationStore, ProximityService};
