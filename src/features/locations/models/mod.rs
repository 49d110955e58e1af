mod geo_point;
mod located_entity;

pub use geo_point::{BoundingBox, GeoJsonPoint, GeoPoint};
pub use located_entity::{
    from_attributes, to_attributes, Attributes, Collection, ListFilter, LocatedEntity,
    LocationPatch, NearQuery, NearbyEntity,
};
