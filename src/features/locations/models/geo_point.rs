use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::locations::errors::GeoError;

/// Mean earth radius in meters (for Haversine formula)
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Relative slack added to bounding boxes so float rounding never excludes a
/// point that sits exactly on the search radius.
const BOUNDING_BOX_MARGIN: f64 = 1e-6;

/// A validated (longitude, latitude) coordinate pair.
///
/// Construction is the only way to obtain a `GeoPoint`, so every value of
/// this type is finite and within range. The pair is always longitude first,
/// in storage and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJsonPoint", into = "GeoJsonPoint")]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(GeoError::InvalidCoordinate(format!(
                "coordinates must be finite numbers, got [{}, {}]",
                longitude, latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Build a point from a `[longitude, latitude]` array as sent by clients
    pub fn from_coordinates(coordinates: &[f64]) -> Result<Self, GeoError> {
        match coordinates {
            [longitude, latitude] => Self::new(*longitude, *latitude),
            _ => Err(GeoError::InvalidCoordinate(format!(
                "location must be [longitude, latitude], got {} values",
                coordinates.len()
            ))),
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Great-circle distance to `other` in meters (spherical earth, Haversine)
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_METERS * c
    }
}

/// GeoJSON point representation used for (de)serialization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeoJsonPoint {
    #[serde(rename = "type", default = "point_type")]
    #[schema(example = "Point")]
    pub kind: String,
    /// `[longitude, latitude]`
    #[schema(example = json!([91.1809, 23.4607]))]
    pub coordinates: Vec<f64>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(value: GeoJsonPoint) -> Result<Self, Self::Error> {
        if value.kind != "Point" {
            return Err(GeoError::InvalidCoordinate(format!(
                "unsupported geometry type '{}', expected 'Point'",
                value.kind
            )));
        }
        GeoPoint::from_coordinates(&value.coordinates)
    }
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: point_type(),
            coordinates: point.coordinates().to_vec(),
        }
    }
}

/// Latitude/longitude window enclosing every point within a radius.
///
/// Used as a cheap, index-friendly prefilter before exact Haversine
/// distances are computed. `longitude` is `None` when the window would span
/// a pole or the antimeridian; callers must then not restrict on longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub longitude: Option<(f64, f64)>,
}

impl BoundingBox {
    pub fn around(center: &GeoPoint, radius_meters: f64) -> Self {
        let angular = radius_meters / EARTH_RADIUS_METERS * (1.0 + BOUNDING_BOX_MARGIN);
        let lat = center.latitude.to_radians();
        let min_lat = lat - angular;
        let max_lat = lat + angular;

        if angular >= FRAC_PI_2 || min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
            return Self {
                min_latitude: min_lat.to_degrees().max(-90.0),
                max_latitude: max_lat.to_degrees().min(90.0),
                longitude: None,
            };
        }

        let delta_lng = (angular.sin() / lat.cos()).asin().to_degrees();
        let min_lng = center.longitude - delta_lng;
        let max_lng = center.longitude + delta_lng;
        let longitude = if min_lng < -180.0 || max_lng > 180.0 {
            None
        } else {
            Some((min_lng, max_lng))
        };

        Self {
            min_latitude: min_lat.to_degrees(),
            max_latitude: max_lat.to_degrees(),
            longitude,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        let lat_ok = (self.min_latitude..=self.max_latitude).contains(&point.latitude);
        let lng_ok = match self.longitude {
            Some((min, max)) => (min..=max).contains(&point.longitude),
            None => true,
        };
        lat_ok && lng_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_points_round_trip() {
        let samples = [
            (91.1809, 23.4607),
            (-180.0, -90.0),
            (180.0, 90.0),
            (0.0, 0.0),
            (-0.0001, 89.9999),
        ];
        for (lng, lat) in samples {
            let point = GeoPoint::new(lng, lat).unwrap();
            assert_eq!(point.longitude(), lng);
            assert_eq!(point.latitude(), lat);
            assert_eq!(point.coordinates(), [lng, lat]);
        }
    }

    #[test]
    fn test_out_of_range_points_rejected() {
        let samples = [
            (180.0001, 0.0),
            (-180.5, 0.0),
            (200.0, 23.46),
            (0.0, 90.0001),
            (0.0, -91.0),
        ];
        for (lng, lat) in samples {
            assert!(matches!(
                GeoPoint::new(lng, lat),
                Err(GeoError::InvalidCoordinate(_))
            ));
        }
    }

    #[test]
    fn test_non_finite_points_rejected() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_from_coordinates_requires_pair() {
        assert!(GeoPoint::from_coordinates(&[91.18, 23.46]).is_ok());
        assert!(GeoPoint::from_coordinates(&[91.18]).is_err());
        assert!(GeoPoint::from_coordinates(&[91.18, 23.46, 5.0]).is_err());
        assert!(GeoPoint::from_coordinates(&[]).is_err());
    }

    #[test]
    fn test_haversine_distance() {
        // Dhaka to Chattogram, roughly 215km great-circle
        let dhaka = GeoPoint::new(90.4125, 23.8103).unwrap();
        let chattogram = GeoPoint::new(91.7832, 22.3569).unwrap();

        let distance = dhaka.distance_to(&chattogram);
        assert!(distance > 205_000.0 && distance < 225_000.0);
        assert!((distance - chattogram.distance_to(&dhaka)).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_same_point() {
        let p = GeoPoint::new(91.1809, 23.4607).unwrap();
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn test_longitude_scale_shrinks_with_latitude() {
        // One degree of longitude is far shorter near the pole than at the equator
        let equator = GeoPoint::new(0.0, 0.0)
            .unwrap()
            .distance_to(&GeoPoint::new(1.0, 0.0).unwrap());
        let north = GeoPoint::new(0.0, 80.0)
            .unwrap()
            .distance_to(&GeoPoint::new(1.0, 80.0).unwrap());
        assert!(north < equator / 4.0);
    }

    #[test]
    fn test_geojson_serialization_is_longitude_first() {
        let p = GeoPoint::new(91.1809, 23.4607).unwrap();
        let value = serde_json::to_value(p).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "type": "Point", "coordinates": [91.1809, 23.4607] })
        );

        let back: GeoPoint = serde_json::from_value(value).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_geojson_deserialization_validates() {
        let bad = serde_json::json!({ "type": "Point", "coordinates": [200.0, 23.46] });
        assert!(serde_json::from_value::<GeoPoint>(bad).is_err());

        let wrong_kind = serde_json::json!({ "type": "LineString", "coordinates": [1.0, 2.0] });
        assert!(serde_json::from_value::<GeoPoint>(wrong_kind).is_err());
    }

    #[test]
    fn test_bounding_box_encloses_radius() {
        let center = GeoPoint::new(91.1809, 23.4607).unwrap();
        let radius = 10_000.0;
        let bbox = BoundingBox::around(&center, radius);

        // Walk the circle boundary and check each point lies inside the box
        for step in 0..72 {
            let bearing = (step as f64 * 5.0).to_radians();
            let angular = radius / EARTH_RADIUS_METERS;
            let lat1 = center.latitude().to_radians();
            let lon1 = center.longitude().to_radians();
            let lat2 = (lat1.sin() * angular.cos()
                + lat1.cos() * angular.sin() * bearing.cos())
            .asin();
            let lon2 = lon1
                + (bearing.sin() * angular.sin() * lat1.cos())
                    .atan2(angular.cos() - lat1.sin() * lat2.sin());
            let edge = GeoPoint::new(lon2.to_degrees(), lat2.to_degrees()).unwrap();
            assert!(bbox.contains(&edge), "bearing {} escaped the box", step * 5);
        }
    }

    #[test]
    fn test_bounding_box_drops_longitude_near_pole_and_antimeridian() {
        let near_pole = GeoPoint::new(10.0, 89.99).unwrap();
        assert!(BoundingBox::around(&near_pole, 5_000.0).longitude.is_none());

        let near_antimeridian = GeoPoint::new(179.999, 0.0).unwrap();
        assert!(BoundingBox::around(&near_antimeridian, 5_000.0)
            .longitude
            .is_none());

        let ordinary = GeoPoint::new(90.4, 23.8).unwrap();
        assert!(BoundingBox::around(&ordinary, 5_000.0).longitude.is_some());
    }
}
