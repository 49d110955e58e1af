mod location_store;
mod memory_location_store;
mod pg_location_store;
mod proximity_service;

pub use location_store::LocationStore;
pub use memory_location_store::InMemoryLocationStore;
pub use pg_location_store::PgLocationStore;
pub use proximity_service::{NearestOptions, ProximityService};
