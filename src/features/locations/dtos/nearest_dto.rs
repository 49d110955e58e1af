use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::locations::errors::GeoError;
use crate::features::locations::models::{GeoPoint, LocatedEntity, NearbyEntity};
use crate::features::locations::services::NearestOptions;

/// Location as submitted when creating or moving a record
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LocationInputDto {
    /// `[longitude, latitude]`
    #[validate(custom(function = "validate_coordinates"))]
    #[schema(example = json!([91.1809, 23.4607]))]
    pub coordinates: Vec<f64>,
}

impl LocationInputDto {
    pub fn to_point(&self) -> Result<GeoPoint, GeoError> {
        GeoPoint::from_coordinates(&self.coordinates)
    }
}

#[allow(clippy::ptr_arg)]
pub fn validate_coordinates(coordinates: &Vec<f64>) -> Result<(), ValidationError> {
    GeoPoint::from_coordinates(coordinates)
        .map(|_| ())
        .map_err(|e| {
            let mut err = ValidationError::new("coordinates");
            err.message = Some(Cow::from(e.to_string()));
            err
        })
}

/// Collection-agnostic body of a nearest-records request.
///
/// Each feature maps its own request DTO (with its own category key) into
/// this before anything touches storage.
#[derive(Debug, Clone, Default)]
pub struct NearestRequest {
    pub location: Option<Vec<f64>>,
    pub max_distance: Option<f64>,
    pub limit: Option<f64>,
    pub category: Option<String>,
}

impl NearestRequest {
    /// Validate the location and options, enforcing the caller's limit cap
    pub fn parse(self, max_limit: usize) -> Result<(GeoPoint, NearestOptions), GeoError> {
        let coordinates = self.location.ok_or_else(|| {
            GeoError::InvalidCoordinate(
                "Valid location [longitude, latitude] is required".to_string(),
            )
        })?;
        let point = GeoPoint::from_coordinates(&coordinates)?;

        let options = NearestOptions::new(self.max_distance, self.limit, self.category, Some(true))?;
        if options.limit > max_limit {
            return Err(GeoError::InvalidParameter(format!(
                "limit must not exceed {}",
                max_limit
            )));
        }

        Ok((point, options))
    }
}

/// One record in a nearest-records response with its distance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDto<T> {
    #[serde(flatten)]
    pub item: T,
    pub distance_meters: f64,
}

/// Response DTO for nearest-records queries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearestResponseDto<T> {
    pub count: usize,
    /// Query point as `[longitude, latitude]`
    pub location: Vec<f64>,
    pub max_distance: f64,
    pub results: Vec<NearbyDto<T>>,
}

impl<T> NearestResponseDto<T>
where
    T: From<LocatedEntity>,
{
    pub fn new(point: GeoPoint, options: &NearestOptions, results: Vec<NearbyEntity>) -> Self {
        let results: Vec<NearbyDto<T>> = results
            .into_iter()
            .map(|n| NearbyDto {
                item: T::from(n.entity),
                distance_meters: n.distance_meters,
            })
            .collect();

        Self {
            count: results.len(),
            location: point.coordinates().to_vec(),
            max_distance: options.max_distance_meters,
            results,
        }
    }
}

impl<T> NearestResponseDto<T> {
    /// Convert every result item, keeping distances and query echo intact
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> NearestResponseDto<U> {
        NearestResponseDto {
            count: self.count,
            location: self.location,
            max_distance: self.max_distance,
            results: self
                .results
                .into_iter()
                .map(|n| NearbyDto {
                    item: f(n.item),
                    distance_meters: n.distance_meters,
                })
                .collect(),
        }
    }
}
