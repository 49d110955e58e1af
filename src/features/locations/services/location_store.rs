use async_trait::async_trait;
use uuid::Uuid;

use crate::features::locations::errors::GeoError;
use crate::features::locations::models::{
    Collection, GeoPoint, ListFilter, LocatedEntity, LocationPatch, NearQuery, NearbyEntity,
};
use crate::shared::types::PaginationQuery;

/// Persistence adapter for geo-indexed records.
///
/// Implementations must apply each write atomically per record: a
/// concurrent `find_near` observes either the old or the new location.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Store a new record; fails with `DuplicateIdentity` if the id exists
    async fn insert(&self, entity: LocatedEntity) -> Result<LocatedEntity, GeoError>;

    /// Apply a partial update; fails with `NotFound` if the id is absent
    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: LocationPatch,
    ) -> Result<LocatedEntity, GeoError>;

    async fn get(&self, collection: Collection, id: Uuid) -> Result<LocatedEntity, GeoError>;

    /// Page through records ordered by creation time, returning the page and the total
    async fn list(
        &self,
        collection: Collection,
        filter: &ListFilter,
        page: &PaginationQuery,
    ) -> Result<(Vec<LocatedEntity>, i64), GeoError>;

    /// Records within `query.max_distance_meters` of `point`, nearest first,
    /// ties broken by id, at most `query.limit` of them
    async fn find_near(
        &self,
        collection: Collection,
        point: &GeoPoint,
        query: &NearQuery,
    ) -> Result<Vec<NearbyEntity>, GeoError>;

    async fn count(&self, collection: Collection, active_only: bool) -> Result<i64, GeoError>;
}

/// Rank prefiltered candidates by exact Haversine distance.
///
/// Candidates failing the category/active restriction or lying outside the
/// radius are dropped before the sort, and truncation to `limit` happens last.
pub fn rank_candidates<I>(point: &GeoPoint, candidates: I, query: &NearQuery) -> Vec<NearbyEntity>
where
    I: IntoIterator<Item = LocatedEntity>,
{
    let mut ranked: Vec<NearbyEntity> = candidates
        .into_iter()
        .filter(|entity| query.admits(entity))
        .filter_map(|entity| {
            let distance_meters = point.distance_to(&entity.location);
            (distance_meters <= query.max_distance_meters).then_some(NearbyEntity {
                entity,
                distance_meters,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_meters
            .total_cmp(&b.distance_meters)
            .then_with(|| a.entity.id.cmp(&b.entity.id))
    });
    ranked.truncate(query.limit);
    ranked
}

/// Reject patches that touch fields the collection does not carry
pub fn check_patch(collection: Collection, patch: &LocationPatch) -> Result<(), GeoError> {
    if patch.facility_id.is_some() && !collection.has_facility_reference() {
        return Err(GeoError::InvalidParameter(format!(
            "{} records cannot reference a facility",
            collection
        )));
    }
    if let Some(category) = &patch.category {
        if category.trim().is_empty() {
            return Err(GeoError::InvalidParameter(
                "category must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::entity_at;

    fn query(max_distance_meters: f64, limit: usize) -> NearQuery {
        NearQuery {
            max_distance_meters,
            limit,
            category: None,
            active_only: true,
        }
    }

    #[test]
    fn test_rank_orders_by_distance_then_id() {
        let origin = GeoPoint::new(91.1809, 23.4607).unwrap();
        let far = entity_at(Collection::Doctor, 91.1850, 23.4650, "neurologist");
        let tie_b = entity_at(Collection::Doctor, 91.1809, 23.4607, "neurologist")
            .with_id(Uuid::from_u128(2));
        let tie_a = entity_at(Collection::Doctor, 91.1809, 23.4607, "neurologist")
            .with_id(Uuid::from_u128(1));

        let ranked = rank_candidates(&origin, vec![far.clone(), tie_b, tie_a], &query(10_000.0, 10));

        let ids: Vec<Uuid> = ranked.iter().map(|n| n.entity.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(2), far.id]);
    }

    #[test]
    fn test_rank_drops_out_of_radius_before_truncating() {
        let origin = GeoPoint::new(91.1809, 23.4607).unwrap();
        let near = entity_at(Collection::Facility, 91.1809, 23.4607, "hospital");
        let far = entity_at(Collection::Facility, 91.1850, 23.4650, "hospital");

        let ranked = rank_candidates(&origin, vec![far, near.clone()], &query(100.0, 10));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entity.id, near.id);
    }

    #[test]
    fn test_rank_excludes_inactive_and_other_categories() {
        let origin = GeoPoint::new(91.1809, 23.4607).unwrap();
        let mut inactive = entity_at(Collection::Doctor, 91.1809, 23.4607, "neurologist");
        inactive.active = false;
        let other = entity_at(Collection::Doctor, 91.1810, 23.4607, "dermatologist");
        let wanted = entity_at(Collection::Doctor, 91.1850, 23.4650, "neurologist");

        let mut q = query(10_000.0, 1);
        q.category = Some("neurologist".to_string());
        let ranked = rank_candidates(&origin, vec![inactive, other, wanted.clone()], &q);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entity.id, wanted.id);
    }

    #[test]
    fn test_check_patch_rejects_facility_reference_on_facilities() {
        let patch = LocationPatch {
            facility_id: Some(Some(Uuid::now_v7())),
            ..Default::default()
        };
        assert!(check_patch(Collection::Doctor, &patch).is_ok());
        assert!(matches!(
            check_patch(Collection::Facility, &patch),
            Err(GeoError::InvalidParameter(_))
        ));
    }
}
