use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
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

/// Raw row shape shared by the `doctors` and `health_facilities` tables
#[derive(Debug, FromRow)]
struct LocatedEntityRow {
    id: Uuid,
    lng: f64,
    lat: f64,
    category: String,
    active: bool,
    facility_id: Option<Uuid>,
    attributes: Json<Attributes>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LocatedEntityRow {
    fn into_entity(self, collection: Collection) -> Result<LocatedEntity, GeoError> {
        let location = GeoPoint::new(self.lng, self.lat).map_err(|e| {
            tracing::error!("Stored {} {} has an invalid location: {}", collection, self.id, e);
            GeoError::StorageUnavailable(format!("stored location for {} is corrupt", self.id))
        })?;

        Ok(LocatedEntity {
            id: self.id,
            collection,
            location,
            category: self.category,
            active: self.active,
            facility_id: self.facility_id,
            attributes: self.attributes.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn select_columns(collection: Collection) -> String {
    let facility = if collection.has_facility_reference() {
        "facility_id"
    } else {
        "NULL::uuid"
    };
    format!(
        "id, lng, lat, {} AS category, active, {} AS facility_id, attributes, created_at, updated_at",
        collection.category_column(),
        facility
    )
}

fn storage_error(context: &str, e: sqlx::Error) -> GeoError {
    tracing::error!("{}: {:?}", context, e);
    GeoError::from(e)
}

/// PostgreSQL-backed store.
///
/// Locations live in indexed `lng`/`lat` columns next to a `location_type`
/// discriminator. `find_near` narrows candidates with a bounding box on
/// those indexes, then ranks them by exact Haversine distance.
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn insert(&self, entity: LocatedEntity) -> Result<LocatedEntity, GeoError> {
        let collection = entity.collection;
        let (facility_column, facility_param) = if collection.has_facility_reference() {
            (", facility_id", ", $9")
        } else {
            ("", "")
        };
        let sql = format!(
            r#"
            INSERT INTO {table} (
                id, location_type, lng, lat, {category}, active, attributes,
                created_at, updated_at{facility_column}
            )
            VALUES ($1, 'Point', $2, $3, $4, $5, $6, $7, $8{facility_param})
            ON CONFLICT (id) DO NOTHING
            RETURNING {columns}
            "#,
            table = collection.table(),
            category = collection.category_column(),
            columns = select_columns(collection),
        );

        let mut query = sqlx::query_as::<_, LocatedEntityRow>(&sql)
            .bind(entity.id)
            .bind(entity.location.longitude())
            .bind(entity.location.latitude())
            .bind(&entity.category)
            .bind(entity.active)
            .bind(Json(&entity.attributes))
            .bind(entity.created_at)
            .bind(entity.updated_at);
        if collection.has_facility_reference() {
            query = query.bind(entity.facility_id);
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to insert {}", collection), e))?
            .ok_or(GeoError::DuplicateIdentity(entity.id))?;

        row.into_entity(collection)
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: LocationPatch,
    ) -> Result<LocatedEntity, GeoError> {
        check_patch(collection, &patch)?;

        let facility_assignment = if collection.has_facility_reference() {
            ",\n                facility_id = CASE WHEN $7 THEN $8 ELSE facility_id END"
        } else {
            ""
        };
        // Single statement, so readers never see lng and lat from different writes
        let sql = format!(
            r#"
            UPDATE {table} SET
                lng = COALESCE($2, lng),
                lat = COALESCE($3, lat),
                {category} = COALESCE($4, {category}),
                active = COALESCE($5, active),
                attributes = attributes || COALESCE($6, '{{}}'::jsonb),
                updated_at = NOW(){facility_assignment}
            WHERE id = $1
            RETURNING {columns}
            "#,
            table = collection.table(),
            category = collection.category_column(),
            columns = select_columns(collection),
        );

        let mut query = sqlx::query_as::<_, LocatedEntityRow>(&sql)
            .bind(id)
            .bind(patch.location.map(|p| p.longitude()))
            .bind(patch.location.map(|p| p.latitude()))
            .bind(patch.category.as_deref())
            .bind(patch.active)
            .bind(patch.attributes.as_ref().map(Json));
        if collection.has_facility_reference() {
            query = query
                .bind(patch.facility_id.is_some())
                .bind(patch.facility_id.flatten());
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to update {} {}", collection, id), e))?
            .ok_or_else(|| GeoError::NotFound(format!("{} {} not found", collection, id)))?;

        row.into_entity(collection)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<LocatedEntity, GeoError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            select_columns(collection),
            collection.table()
        );

        let row = sqlx::query_as::<_, LocatedEntityRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to fetch {} {}", collection, id), e))?
            .ok_or_else(|| GeoError::NotFound(format!("{} {} not found", collection, id)))?;

        row.into_entity(collection)
    }

    async fn list(
        &self,
        collection: Collection,
        filter: &ListFilter,
        page: &PaginationQuery,
    ) -> Result<(Vec<LocatedEntity>, i64), GeoError> {
        let predicate = format!(
            r#"
            ($1::text IS NULL OR {category} = $1)
            AND ($2::bool IS NULL OR active = $2)
            AND ($3::jsonb IS NULL OR attributes @> $3)
            "#,
            category = collection.category_column()
        );
        let attributes = filter.attributes.as_ref().map(Json);

        let count_sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            collection.table(),
            predicate
        );
        let total: i64 = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.category.as_deref())
            .bind(filter.active)
            .bind(attributes.clone())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to count {} records", collection), e))?;

        let page_sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY created_at ASC, id ASC LIMIT $4 OFFSET $5",
            select_columns(collection),
            collection.table(),
            predicate
        );
        let rows = sqlx::query_as::<_, LocatedEntityRow>(&page_sql)
            .bind(filter.category.as_deref())
            .bind(filter.active)
            .bind(attributes)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to list {} records", collection), e))?;

        let items = rows
            .into_iter()
            .map(|row| row.into_entity(collection))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((items, total))
    }

    async fn find_near(
        &self,
        collection: Collection,
        point: &GeoPoint,
        query: &NearQuery,
    ) -> Result<Vec<NearbyEntity>, GeoError> {
        let bbox = BoundingBox::around(point, query.max_distance_meters);
        let sql = format!(
            r#"
            SELECT {columns}
            FROM {table}
            WHERE lat BETWEEN $1 AND $2
            AND ($3::float8 IS NULL OR lng BETWEEN $3 AND $4)
            AND ($5::text IS NULL OR {category} = $5)
            AND (NOT $6 OR active = TRUE)
            "#,
            columns = select_columns(collection),
            table = collection.table(),
            category = collection.category_column(),
        );

        let rows = sqlx::query_as::<_, LocatedEntityRow>(&sql)
            .bind(bbox.min_latitude)
            .bind(bbox.max_latitude)
            .bind(bbox.longitude.map(|(min, _)| min))
            .bind(bbox.longitude.map(|(_, max)| max))
            .bind(query.category.as_deref())
            .bind(query.active_only)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                storage_error(&format!("Failed to find {} records near point", collection), e)
            })?;

        tracing::debug!(
            "Bounding box prefilter returned {} {} candidates",
            rows.len(),
            collection
        );

        let candidates = rows
            .into_iter()
            .map(|row| row.into_entity(collection))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rank_candidates(point, candidates, query))
    }

    async fn count(&self, collection: Collection, active_only: bool) -> Result<i64, GeoError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE (NOT $1 OR active = TRUE)",
            collection.table()
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(active_only)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to count {} records", collection), e))
    }
}

/// These run against a live database: `DATABASE_URL=... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{entity_at, profile};
    use serde_json::json;

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_insert_get_and_duplicate(pool: PgPool) {
        let store = PgLocationStore::new(pool);
        let facility = store
            .insert(entity_at(Collection::Facility, 91.18, 23.46, "hospital"))
            .await
            .unwrap();
        let doctor = entity_at(Collection::Doctor, 91.1819, 23.4607, "neurologist")
            .with_facility(Some(facility.id));
        let id = doctor.id;

        let inserted = store.insert(doctor.clone()).await.unwrap();
        assert_eq!(inserted.facility_id, Some(facility.id));
        assert_eq!(inserted.location.coordinates(), [91.1819, 23.4607]);

        assert_eq!(
            store.insert(doctor).await.unwrap_err(),
            GeoError::DuplicateIdentity(id)
        );

        let fetched = store.get(Collection::Facility, facility.id).await.unwrap();
        assert_eq!(fetched.category, "hospital");
        assert_eq!(fetched.facility_id, None);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_update_moves_and_clears_facility(pool: PgPool) {
        let store = PgLocationStore::new(pool);
        let doctor = store
            .insert(
                entity_at(Collection::Doctor, 90.41, 23.81, "neurologist")
                    .with_facility(Some(Uuid::now_v7())),
            )
            .await
            .unwrap();

        let patch = LocationPatch {
            location: Some(GeoPoint::new(91.18, 23.46).unwrap()),
            facility_id: Some(None),
            attributes: Some(profile(json!({ "fees": 700 }))),
            ..Default::default()
        };
        let updated = store
            .update(Collection::Doctor, doctor.id, patch)
            .await
            .unwrap();

        assert_eq!(updated.location.coordinates(), [91.18, 23.46]);
        assert_eq!(updated.facility_id, None);
        assert_eq!(updated.attributes.get("fees"), Some(&json!(700)));
        assert!(updated.attributes.contains_key("name"));

        let missing = store
            .update(Collection::Doctor, Uuid::now_v7(), LocationPatch::deactivate())
            .await;
        assert!(matches!(missing, Err(GeoError::NotFound(_))));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_find_near_and_list(pool: PgPool) {
        let store = PgLocationStore::new(pool);
        let near = store
            .insert(entity_at(Collection::Doctor, 91.1819, 23.4607, "neurologist"))
            .await
            .unwrap();
        store
            .insert(entity_at(Collection::Doctor, 91.1810, 23.4607, "pediatrician"))
            .await
            .unwrap();
        store
            .insert(entity_at(Collection::Doctor, 90.41, 23.81, "neurologist"))
            .await
            .unwrap();

        let point = GeoPoint::new(91.1809, 23.4607).unwrap();
        let query = NearQuery {
            max_distance_meters: 10_000.0,
            limit: 10,
            category: Some("neurologist".to_string()),
            active_only: true,
        };
        let results = store
            .find_near(Collection::Doctor, &point, &query)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity.id, near.id);
        assert!((results[0].distance_meters - 102.0).abs() < 1.0);

        let filter = ListFilter {
            category: Some("neurologist".to_string()),
            active: Some(true),
            attributes: None,
        };
        let (items, total) = store
            .list(Collection::Doctor, &filter, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!((items.len(), total), (2, 2));
        assert_eq!(store.count(Collection::Doctor, true).await.unwrap(), 3);
    }
}
