use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::features::locations::errors::GeoError;
use crate::features::locations::models::{
    Attributes, BoundingBox, Collection, GeoPoint, ListFilter, LocatedEntity, LocationPatch,
    NearQuery, NearbyEntity,
};
use crate::features::locations::services::location_store::{
    check_patch, rank_candidates, LocationStore,
};
use crate::shared::types::PaginationQuery;

type Records = HashMap<Collection, BTreeMap<Uuid, LocatedEntity>>;

/// Process-local store scanning every record on each proximity query.
///
/// Adequate for the bounded dataset this service targets and for tests.
/// Each write happens under one write lock, so updates are atomic to readers.
#[derive(Default)]
pub struct InMemoryLocationStore {
    records: RwLock<Records>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>, GeoError> {
        self.records
            .read()
            .map_err(|_| GeoError::StorageUnavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>, GeoError> {
        self.records
            .write()
            .map_err(|_| GeoError::StorageUnavailable("in-memory store lock poisoned".to_string()))
    }
}

/// Postgres `@>` containment for JSON values
fn json_contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::Object(h), Value::Object(n)) => n
            .iter()
            .all(|(key, nv)| h.get(key).is_some_and(|hv| json_contains(hv, nv))),
        (Value::Array(h), Value::Array(n)) => n
            .iter()
            .all(|nv| h.iter().any(|hv| json_contains(hv, nv))),
        (Value::Array(h), scalar) if !scalar.is_object() => h.iter().any(|hv| hv == scalar),
        _ => haystack == needle,
    }
}

fn attributes_contain(attributes: &Attributes, needle: &Attributes) -> bool {
    needle.iter().all(|(key, nv)| {
        attributes
            .get(key)
            .is_some_and(|hv| json_contains(hv, nv))
    })
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn insert(&self, entity: LocatedEntity) -> Result<LocatedEntity, GeoError> {
        let mut records = self.write()?;
        let collection = records.entry(entity.collection).or_default();
        if collection.contains_key(&entity.id) {
            return Err(GeoError::DuplicateIdentity(entity.id));
        }
        collection.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: LocationPatch,
    ) -> Result<LocatedEntity, GeoError> {
        check_patch(collection, &patch)?;

        let mut records = self.write()?;
        let entity = records
            .get_mut(&collection)
            .and_then(|c| c.get_mut(&id))
            .ok_or_else(|| GeoError::NotFound(format!("{} {} not found", collection, id)))?;

        if let Some(location) = patch.location {
            entity.location = location;
        }
        if let Some(category) = patch.category {
            entity.category = category;
        }
        if let Some(active) = patch.active {
            entity.active = active;
        }
        if let Some(facility_id) = patch.facility_id {
            entity.facility_id = facility_id;
        }
        if let Some(attributes) = patch.attributes {
            entity.attributes.extend(attributes);
        }
        entity.updated_at = Utc::now();

        Ok(entity.clone())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<LocatedEntity, GeoError> {
        self.read()?
            .get(&collection)
            .and_then(|c| c.get(&id))
            .cloned()
            .ok_or_else(|| GeoError::NotFound(format!("{} {} not found", collection, id)))
    }

    async fn list(
        &self,
        collection: Collection,
        filter: &ListFilter,
        page: &PaginationQuery,
    ) -> Result<(Vec<LocatedEntity>, i64), GeoError> {
        let records = self.read()?;
        let mut matching: Vec<&LocatedEntity> = records
            .get(&collection)
            .map(|c| c.values().collect())
            .unwrap_or_default();

        matching.retain(|e| {
            filter.category.as_ref().is_none_or(|c| e.category == *c)
                && filter.active.is_none_or(|a| e.active == a)
                && filter
                    .attributes
                    .as_ref()
                    .is_none_or(|needle| attributes_contain(&e.attributes, needle))
        });
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn find_near(
        &self,
        collection: Collection,
        point: &GeoPoint,
        query: &NearQuery,
    ) -> Result<Vec<NearbyEntity>, GeoError> {
        let bbox = BoundingBox::around(point, query.max_distance_meters);
        let records = self.read()?;
        let candidates = records
            .get(&collection)
            .into_iter()
            .flat_map(|c| c.values())
            .filter(|e| bbox.contains(&e.location))
            .cloned();

        Ok(rank_candidates(point, candidates, query))
    }

    async fn count(&self, collection: Collection, active_only: bool) -> Result<i64, GeoError> {
        let records = self.read()?;
        let count = records
            .get(&collection)
            .map(|c| c.values().filter(|e| !active_only || e.active).count())
            .unwrap_or(0);
        Ok(count as i64)
    }
}
