use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use crate::features::locations::errors::GeoError;
use crate::features::locations::models::{
    Attributes, Collection, GeoPoint, ListFilter, LocatedEntity, LocationPatch, NearQuery,
    NearbyEntity,
};
use crate::features::locations::services::{InMemoryLocationStore, LocationStore};
use crate::shared::types::PaginationQuery;

const SPECIALITIES: [&str; 4] = ["neurologist", "pediatrician", "gynecologist", "dermatologist"];

/// Turn a `json!` object into record attributes
pub fn profile(value: serde_json::Value) -> Attributes {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Active record at the given coordinates with a generated name
pub fn entity_at(collection: Collection, lng: f64, lat: f64, category: &str) -> LocatedEntity {
    let name: String = Name().fake();
    LocatedEntity::new(
        collection,
        GeoPoint::new(lng, lat).unwrap(),
        category,
        profile(serde_json::json!({ "name": name })),
    )
}

/// `count` records scattered within roughly 30 km of `center`, about one in
/// five inactive, categories drawn from a small fixed set
pub fn random_entities(collection: Collection, center: &GeoPoint, count: usize) -> Vec<LocatedEntity> {
    (0..count)
        .map(|_| {
            let lng = center.longitude() + (-0.3..0.3).fake::<f64>();
            let lat = center.latitude() + (-0.3..0.3).fake::<f64>();
            let category = SPECIALITIES[(0..SPECIALITIES.len()).fake::<usize>()];
            let mut entity = entity_at(collection, lng, lat, category);
            entity.active = (0..5).fake::<u8>() != 0;
            entity
        })
        .collect()
}

/// In-memory store that records how often it was queried and can be told to
/// fail every call as if the database were unreachable
pub struct CountingStore {
    inner: InMemoryLocationStore,
    failing: bool,
    calls: AtomicUsize,
    find_near_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryLocationStore::new(),
            failing: false,
            calls: AtomicUsize::new(0),
            find_near_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn find_near_calls(&self) -> usize {
        self.find_near_calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> Result<(), GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(GeoError::StorageUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LocationStore for CountingStore {
    async fn insert(&self, entity: LocatedEntity) -> Result<LocatedEntity, GeoError> {
        self.record()?;
        self.inner.insert(entity).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: LocationPatch,
    ) -> Result<LocatedEntity, GeoError> {
        self.record()?;
        self.inner.update(collection, id, patch).await
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<LocatedEntity, GeoError> {
        self.record()?;
        self.inner.get(collection, id).await
    }

    async fn list(
        &self,
        collection: Collection,
        filter: &ListFilter,
        page: &PaginationQuery,
    ) -> Result<(Vec<LocatedEntity>, i64), GeoError> {
        self.record()?;
        self.inner.list(collection, filter, page).await
    }

    async fn find_near(
        &self,
        collection: Collection,
        point: &GeoPoint,
        query: &NearQuery,
    ) -> Result<Vec<NearbyEntity>, GeoError> {
        self.find_near_calls.fetch_add(1, Ordering::SeqCst);
        self.record()?;
        self.inner.find_near(collection, point, query).await
    }

    async fn count(&self, collection: Collection, active_only: bool) -> Result<i64, GeoError> {
        self.record()?;
        self.inner.count(collection, active_only).await
    }
}

/// Wrap a feature router in an `axum-test` server
pub fn test_server(router: Router) -> TestServer {
    TestServer::new(router).unwrap()
}
