use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::locations::errors::GeoError;
use crate::features::locations::models::GeoPoint;

/// Free-form record attributes (name, address, contact, fees, ...)
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Geo-indexed collections served by the proximity engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Doctor,
    Facility,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Doctor => "doctors",
            Collection::Facility => "health_facilities",
        }
    }

    /// Column holding the category tag (speciality / facility type)
    pub fn category_column(&self) -> &'static str {
        match self {
            Collection::Doctor => "speciality",
            Collection::Facility => "facility_type",
        }
    }

    /// Only doctors may point at a facility
    pub fn has_facility_reference(&self) -> bool {
        matches!(self, Collection::Doctor)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Doctor => write!(f, "doctor"),
            Collection::Facility => write!(f, "facility"),
        }
    }
}

/// A doctor or health facility record carrying a location and category tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedEntity {
    pub id: Uuid,
    pub collection: Collection,
    pub location: GeoPoint,
    pub category: String,
    pub active: bool,
    pub facility_id: Option<Uuid>,
    pub attributes: Attributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocatedEntity {
    /// New active record with a time-ordered identifier
    pub fn new(
        collection: Collection,
        location: GeoPoint,
        category: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            collection,
            location,
            category: category.into(),
            active: true,
            facility_id: None,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    #[cfg(test)]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_facility(mut self, facility_id: Option<Uuid>) -> Self {
        self.facility_id = facility_id;
        self
    }
}

/// Partial update applied atomically to one record.
///
/// `location` is a `GeoPoint`, so a patched location has already been
/// re-validated by construction. `attributes` are merged key by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    pub location: Option<GeoPoint>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub facility_id: Option<Option<Uuid>>,
    pub attributes: Option<Attributes>,
}

impl LocationPatch {
    pub fn deactivate() -> Self {
        Self {
            active: Some(false),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Queue a top-level attribute for merging; `None` leaves the key untouched
    pub fn set_attribute<T: Serialize>(
        &mut self,
        key: &str,
        value: Option<T>,
    ) -> Result<(), GeoError> {
        let Some(value) = value else {
            return Ok(());
        };
        let value = serde_json::to_value(value)
            .map_err(|e| GeoError::InvalidParameter(format!("{}: {}", key, e)))?;
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// Serialize a typed profile into the attribute document of a record
pub fn to_attributes<T: Serialize>(value: &T) -> Result<Attributes, GeoError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(GeoError::InvalidParameter(format!(
            "attributes must be a JSON object, got {}",
            other
        ))),
        Err(e) => Err(GeoError::InvalidParameter(e.to_string())),
    }
}

/// Read a typed profile back out of a record's attribute document.
///
/// Top-level keys that do not fit the profile are dropped one by one and
/// logged, so a single malformed value never blanks the rest of the record.
pub fn from_attributes<T>(id: Uuid, attributes: Attributes) -> T
where
    T: DeserializeOwned + Default,
{
    let parse = |map: &Attributes| T::deserialize(&serde_json::Value::Object(map.clone()));

    let err = match parse(&attributes) {
        Ok(profile) => return profile,
        Err(e) => e,
    };
    tracing::warn!("Record {} has malformed attributes: {}", id, err);

    let mut kept = Attributes::new();
    for (key, value) in attributes {
        kept.insert(key.clone(), value);
        if let Err(e) = parse(&kept) {
            tracing::warn!("Dropping attribute {:?} of record {}: {}", key, id, e);
            kept.remove(&key);
        }
    }

    parse(&kept).unwrap_or_default()
}

/// Filter for paginated listings
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub category: Option<String>,
    pub active: Option<bool>,
    /// JSON object the record attributes must contain (Postgres `@>` semantics)
    pub attributes: Option<Attributes>,
}

/// Physical nearest-neighbour query handed to a storage adapter.
///
/// `category` and `active_only` restrict the candidate set before ranking,
/// so they never shrink a result that could otherwise be filled.
#[derive(Debug, Clone, PartialEq)]
pub struct NearQuery {
    pub max_distance_meters: f64,
    pub limit: usize,
    pub category: Option<String>,
    pub active_only: bool,
}

impl NearQuery {
    pub fn admits(&self, entity: &LocatedEntity) -> bool {
        if self.active_only && !entity.active {
            return false;
        }
        match &self.category {
            Some(category) => entity.category == *category,
            None => true,
        }
    }
}

/// One ranked result of a proximity query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyEntity {
    pub entity: LocatedEntity,
    pub distance_meters: f64,
}
