use std::sync::Arc;

use crate::features::locations::errors::GeoError;
use crate::features::locations::models::{Collection, GeoPoint, NearQuery, NearbyEntity};
use crate::features::locations::services::LocationStore;
use crate::shared::constants::{DEFAULT_NEAREST_LIMIT, DEFAULT_NEAREST_MAX_DISTANCE_METERS};

/// Validated options for a nearest-entity query
#[derive(Debug, Clone, PartialEq)]
pub struct NearestOptions {
    pub max_distance_meters: f64,
    pub limit: usize,
    pub category: Option<String>,
    pub active_only: bool,
}

impl Default for NearestOptions {
    fn default() -> Self {
        Self {
            max_distance_meters: DEFAULT_NEAREST_MAX_DISTANCE_METERS,
            limit: DEFAULT_NEAREST_LIMIT,
            category: None,
            active_only: true,
        }
    }
}

impl NearestOptions {
    /// Apply defaults and validate raw caller input.
    ///
    /// `limit` arrives as a JSON number, so fractional values are rejected
    /// here rather than silently truncated. An empty category means no filter.
    pub fn new(
        max_distance_meters: Option<f64>,
        limit: Option<f64>,
        category: Option<String>,
        active_only: Option<bool>,
    ) -> Result<Self, GeoError> {
        let max_distance_meters = match max_distance_meters {
            None => DEFAULT_NEAREST_MAX_DISTANCE_METERS,
            Some(d) if d.is_finite() && d > 0.0 => d,
            Some(d) => {
                return Err(GeoError::InvalidParameter(format!(
                    "maxDistance must be a positive number, got {}",
                    d
                )))
            }
        };

        let limit = match limit {
            None => DEFAULT_NEAREST_LIMIT,
            Some(l) if l.is_finite() && l >= 1.0 && l.fract() == 0.0 && l <= usize::MAX as f64 => {
                l as usize
            }
            Some(l) => {
                return Err(GeoError::InvalidParameter(format!(
                    "limit must be a positive integer, got {}",
                    l
                )))
            }
        };

        Ok(Self {
            max_distance_meters,
            limit,
            category: category.filter(|c| !c.is_empty()),
            active_only: active_only.unwrap_or(true),
        })
    }
}

/// Answers "which records are nearest to this point" for either collection.
///
/// Stateless: every call validates its input, performs exactly one storage
/// query and returns. Storage failures are propagated, never turned into an
/// empty result.
pub struct ProximityService {
    store: Arc<dyn LocationStore>,
}

impl ProximityService {
    pub fn new(store: Arc<dyn LocationStore>) -> Self {
        Self { store }
    }

    pub async fn query_nearest(
        &self,
        collection: Collection,
        point: GeoPoint,
        options: &NearestOptions,
    ) -> Result<Vec<NearbyEntity>, GeoError> {
        let query = NearQuery {
            max_distance_meters: options.max_distance_meters,
            limit: options.limit,
            category: options.category.clone(),
            active_only: options.active_only,
        };

        let results = self.store.find_near(collection, &point, &query).await?;

        tracing::debug!(
            "Nearest {} query at [{}, {}] within {}m (limit {}, category {:?}) returned {} results",
            collection,
            point.longitude(),
            point.latitude(),
            query.max_distance_meters,
            query.limit,
            query.category,
            results.len()
        );

        Ok(results)
    }
}
