use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::doctors::dtos::{
    CreateDoctorDto, DoctorDetailDto, DoctorListItemDto, DoctorResponseDto, ListDoctorsQuery,
    NearestDoctorsDto, UpdateDoctorDto,
};
use crate::features::facilities::dtos::{FacilityResponseDto, FacilitySummaryDto};
use crate::features::locations::dtos::{NearestRequest, NearestResponseDto};
use crate::features::locations::models::{
    to_attributes, Attributes, Collection, ListFilter, LocatedEntity, LocationPatch,
};
use crate::features::locations::{GeoError, LocationStore, ProximityService};
use crate::shared::types::PaginationQuery;

/// Doctor directory: CRUD over the doctor collection plus nearest search
pub struct DoctorService {
    store: Arc<dyn LocationStore>,
    proximity: Arc<ProximityService>,
    max_limit: usize,
}

impl DoctorService {
    pub fn new(
        store: Arc<dyn LocationStore>,
        proximity: Arc<ProximityService>,
        max_limit: usize,
    ) -> Self {
        Self {
            store,
            proximity,
            max_limit,
        }
    }

    pub async fn create(&self, dto: CreateDoctorDto) -> Result<DoctorResponseDto> {
        let speciality = dto.speciality.trim().to_string();
        let facility = dto.facility;
        let (point, profile) = dto.into_parts()?;

        let entity = LocatedEntity::new(
            Collection::Doctor,
            point,
            speciality,
            to_attributes(&profile)?,
        )
        .with_facility(facility);

        let doctor = self.store.insert(entity).await?;

        tracing::info!(
            "Doctor created: id={}, speciality={}",
            doctor.id,
            doctor.category
        );

        Ok(doctor.into())
    }

    pub async fn list(&self, query: ListDoctorsQuery) -> Result<(Vec<DoctorListItemDto>, i64)> {
        let mut containment = Attributes::new();
        if let Some(district) = query.district.filter(|d| !d.is_empty()) {
            containment.insert("address".to_string(), json!({ "district": district }));
        }
        if let Some(verified) = query.verified {
            containment.insert("verified".to_string(), json!(verified));
        }

        let filter = ListFilter {
            category: query.speciality.filter(|s| !s.is_empty()),
            active: Some(query.active.unwrap_or(true)),
            attributes: (!containment.is_empty()).then_some(containment),
        };
        let page = PaginationQuery::new(query.page, query.page_size);

        let (doctors, total) = self.store.list(Collection::Doctor, &filter, &page).await?;

        let doctors: Vec<DoctorResponseDto> = doctors.into_iter().map(Into::into).collect();
        let facilities = self.facility_summaries(&doctors).await?;

        Ok((attach_facilities(doctors, &facilities), total))
    }

    /// Fetch a doctor with its facility resolved. A reference to a facility
    /// that no longer exists yields `facility: None` rather than an error.
    pub async fn get(&self, id: Uuid) -> Result<DoctorDetailDto> {
        let doctor = self
            .store
            .get(Collection::Doctor, id)
            .await
            .map_err(|e| not_found(e, id))?;

        let facility = match doctor.facility_id {
            Some(facility_id) => self.resolve_facility(doctor.id, facility_id).await?,
            None => None,
        };

        Ok(DoctorDetailDto {
            doctor: doctor.into(),
            facility,
        })
    }

    pub async fn update(&self, id: Uuid, dto: UpdateDoctorDto) -> Result<DoctorResponseDto> {
        let patch = dto.into_patch()?;
        if patch.is_empty() {
            let doctor = self
                .store
                .get(Collection::Doctor, id)
                .await
                .map_err(|e| not_found(e, id))?;
            return Ok(doctor.into());
        }

        let doctor = self
            .store
            .update(Collection::Doctor, id, patch)
            .await
            .map_err(|e| not_found(e, id))?;

        tracing::info!("Doctor updated: id={}", doctor.id);

        Ok(doctor.into())
    }

    /// Soft delete: the record stays but drops out of listings and searches
    pub async fn deactivate(&self, id: Uuid) -> Result<DoctorResponseDto> {
        let doctor = self
            .store
            .update(Collection::Doctor, id, LocationPatch::deactivate())
            .await
            .map_err(|e| not_found(e, id))?;

        tracing::info!("Doctor deactivated: id={}", doctor.id);

        Ok(doctor.into())
    }

    pub async fn nearest(
        &self,
        dto: NearestDoctorsDto,
    ) -> Result<NearestResponseDto<DoctorListItemDto>> {
        let (point, options) = NearestRequest::from(dto).parse(self.max_limit)?;

        let results = self
            .proximity
            .query_nearest(Collection::Doctor, point, &options)
            .await?;

        let nearest = NearestResponseDto::<DoctorResponseDto>::new(point, &options, results);
        let doctors: Vec<&DoctorResponseDto> = nearest.results.iter().map(|n| &n.item).collect();
        let facilities = self.facility_summaries(doctors).await?;

        Ok(nearest.map(|doctor| with_facility(doctor, &facilities)))
    }

    /// Look up a referenced facility; a dangling reference resolves to `None`
    async fn resolve_facility(
        &self,
        doctor_id: Uuid,
        facility_id: Uuid,
    ) -> Result<Option<FacilityResponseDto>> {
        match self.store.get(Collection::Facility, facility_id).await {
            Ok(facility) => Ok(Some(facility.into())),
            Err(GeoError::NotFound(_)) => {
                tracing::warn!(
                    "Doctor {} references missing facility {}",
                    doctor_id,
                    facility_id
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve each distinct facility referenced by `doctors` once
    async fn facility_summaries<'a>(
        &self,
        doctors: impl IntoIterator<Item = &'a DoctorResponseDto>,
    ) -> Result<HashMap<Uuid, FacilitySummaryDto>> {
        let mut summaries = HashMap::new();
        for doctor in doctors {
            let Some(facility_id) = doctor.facility_id else {
                continue;
            };
            if summaries.contains_key(&facility_id) {
                continue;
            }
            if let Some(facility) = self.resolve_facility(doctor.id, facility_id).await? {
                summaries.insert(facility_id, facility.into());
            }
        }
        Ok(summaries)
    }
}

fn with_facility(
    doctor: DoctorResponseDto,
    facilities: &HashMap<Uuid, FacilitySummaryDto>,
) -> DoctorListItemDto {
    let facility = doctor
        .facility_id
        .and_then(|id| facilities.get(&id).cloned());
    DoctorListItemDto { doctor, facility }
}

fn attach_facilities(
    doctors: Vec<DoctorResponseDto>,
    facilities: &HashMap<Uuid, FacilitySummaryDto>,
) -> Vec<DoctorListItemDto> {
    doctors
        .into_iter()
        .map(|doctor| with_facility(doctor, facilities))
        .collect()
}

fn not_found(err: GeoError, id: Uuid) -> AppError {
    match err {
        GeoError::NotFound(_) => AppError::NotFound(format!("Doctor with id {} not found", id)),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::locations::models::GeoPoint;
    use crate::features::locations::InMemoryLocationStore;
    use crate::shared::test_helpers::{entity_at, profile, CountingStore};

    fn service_with(store: Arc<dyn LocationStore>) -> DoctorService {
        let proximity = Arc::new(ProximityService::new(Arc::clone(&store)));
        DoctorService::new(store, proximity, 100)
    }

    fn create_dto(name: &str, speciality: &str, coordinates: [f64; 2]) -> CreateDoctorDto {
        serde_json::from_value(json!({
            "name": name,
            "speciality": speciality,
            "location": { "coordinates": coordinates },
            "address": { "line1": "Kandirpar", "district": "Cumilla" },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service_with(Arc::new(InMemoryLocationStore::new()));

        let created = service
            .create(create_dto("Dr. Karim", "cardiologist", [91.18, 23.46]))
            .await
            .unwrap();
        assert!(created.active);
        assert_eq!(created.profile.name, "Dr. Karim");

        let detail = service.get(created.id).await.unwrap();
        assert_eq!(detail.doctor.id, created.id);
        assert!(detail.facility.is_none());
    }

    #[tokio::test]
    async fn test_get_resolves_facility_and_tolerates_dangling_reference() {
        let store = Arc::new(InMemoryLocationStore::new());
        let facility = store
            .insert(entity_at(Collection::Facility, 91.18, 23.46, "hospital"))
            .await
            .unwrap();
        let service = service_with(store);

        let mut dto = create_dto("Dr. Nasrin", "pediatrician", [91.18, 23.46]);
        dto.facility = Some(facility.id);
        let linked = service.create(dto).await.unwrap();

        let mut dto = create_dto("Dr. Hasan", "pediatrician", [91.18, 23.46]);
        dto.facility = Some(Uuid::now_v7());
        let dangling = service.create(dto).await.unwrap();

        let detail = service.get(linked.id).await.unwrap();
        assert_eq!(detail.facility.map(|f| f.id), Some(facility.id));

        let detail = service.get(dangling.id).await.unwrap();
        assert!(detail.facility.is_none());
    }

    #[tokio::test]
    async fn test_get_keeps_profile_when_fees_are_malformed() {
        let store = Arc::new(InMemoryLocationStore::new());
        let imported = store
            .insert(LocatedEntity::new(
                Collection::Doctor,
                GeoPoint::new(91.18, 23.46).unwrap(),
                "cardiologist",
                profile(json!({ "name": "Dr. Imported", "fees": "500" })),
            ))
            .await
            .unwrap();
        let service = service_with(store);

        let detail = service.get(imported.id).await.unwrap();
        assert_eq!(detail.doctor.profile.name, "Dr. Imported");
        assert_eq!(detail.doctor.profile.fees, None);
    }

    #[tokio::test]
    async fn test_nearest_and_list_carry_facility_summary() {
        let store = Arc::new(InMemoryLocationStore::new());
        let facility = store
            .insert(LocatedEntity::new(
                Collection::Facility,
                GeoPoint::new(91.18, 23.46).unwrap(),
                "hospital",
                profile(json!({
                    "name": "Cumilla General Hospital",
                    "address": "Kandirpar, Cumilla"
                })),
            ))
            .await
            .unwrap();
        let service = service_with(store);

        let mut dto = create_dto("Dr. Nasrin", "pediatrician", [91.18, 23.46]);
        dto.facility = Some(facility.id);
        let linked = service.create(dto).await.unwrap();

        let mut dto = create_dto("Dr. Hasan", "pediatrician", [91.181, 23.46]);
        dto.facility = Some(Uuid::now_v7());
        let dangling = service.create(dto).await.unwrap();

        let expected = FacilitySummaryDto {
            id: facility.id,
            name: "Cumilla General Hospital".to_string(),
            facility_type: "hospital".to_string(),
            address: "Kandirpar, Cumilla".to_string(),
        };

        let nearest = service
            .nearest(NearestDoctorsDto {
                location: Some(vec![91.18, 23.46]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(nearest.count, 2);
        assert_eq!(nearest.results[0].item.doctor.id, linked.id);
        assert_eq!(nearest.results[0].item.facility.as_ref(), Some(&expected));
        assert_eq!(nearest.results[1].item.doctor.id, dangling.id);
        assert!(nearest.results[1].item.facility.is_none());

        let (doctors, _) = service.list(ListDoctorsQuery::default()).await.unwrap();
        let listed = doctors.iter().find(|d| d.doctor.id == linked.id).unwrap();
        assert_eq!(listed.facility.as_ref(), Some(&expected));
        let listed = doctors.iter().find(|d| d.doctor.id == dangling.id).unwrap();
        assert!(listed.facility.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_doctor_is_not_found() {
        let service = service_with(Arc::new(InMemoryLocationStore::new()));
        let err = service.get(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_listing_and_nearest() {
        let service = service_with(Arc::new(InMemoryLocationStore::new()));
        let doctor = service
            .create(create_dto("Dr. Rumana", "neurologist", [91.18, 23.46]))
            .await
            .unwrap();

        let removed = service.deactivate(doctor.id).await.unwrap();
        assert!(!removed.active);

        let (active, total) = service.list(ListDoctorsQuery::default()).await.unwrap();
        assert!(active.is_empty());
        assert_eq!(total, 0);

        let (inactive, _) = service
            .list(ListDoctorsQuery {
                active: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(inactive.len(), 1);

        let nearest = service
            .nearest(NearestDoctorsDto {
                location: Some(vec![91.18, 23.46]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(nearest.count, 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_district_and_verified() {
        let store = Arc::new(InMemoryLocationStore::new());
        let mut attrs = profile(json!({
            "name": "Dr. Alam",
            "address": { "line1": "Station Road", "district": "Feni" },
            "verified": true
        }));
        store
            .insert(LocatedEntity::new(
                Collection::Doctor,
                GeoPoint::new(91.39, 23.01).unwrap(),
                "dermatologist",
                attrs.clone(),
            ))
            .await
            .unwrap();
        attrs.insert("verified".to_string(), json!(false));
        store
            .insert(LocatedEntity::new(
                Collection::Doctor,
                GeoPoint::new(91.40, 23.02).unwrap(),
                "dermatologist",
                attrs,
            ))
            .await
            .unwrap();
        let service = service_with(store);

        let (feni, total) = service
            .list(ListDoctorsQuery {
                district: Some("Feni".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!((feni.len(), total), (2, 2));

        let (verified, _) = service
            .list(ListDoctorsQuery {
                district: Some("Feni".to_string()),
                verified: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(verified.len(), 1);
        assert!(verified[0].doctor.profile.verified);
    }

    #[tokio::test]
    async fn test_update_moves_doctor() {
        let service = service_with(Arc::new(InMemoryLocationStore::new()));
        let doctor = service
            .create(create_dto("Dr. Sultana", "neurologist", [90.41, 23.81]))
            .await
            .unwrap();

        let dto: UpdateDoctorDto = serde_json::from_value(json!({
            "location": { "coordinates": [91.18, 23.46] },
            "fees": 700
        }))
        .unwrap();
        let updated = service.update(doctor.id, dto).await.unwrap();
        assert_eq!(updated.location.coordinates(), [91.18, 23.46]);
        assert_eq!(updated.profile.fees, Some(700.0));
        assert_eq!(updated.profile.name, "Dr. Sultana");

        let nearest = service
            .nearest(NearestDoctorsDto {
                location: Some(vec![91.18, 23.46]),
                max_distance: Some(100.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(nearest.count, 1);
    }

    #[tokio::test]
    async fn test_nearest_rejects_invalid_location_without_storage_call() {
        let store = Arc::new(CountingStore::new());
        let service = service_with(store.clone());

        let err = service
            .nearest(NearestDoctorsDto {
                location: Some(vec![91.18]),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_service_unavailable() {
        let service = service_with(Arc::new(CountingStore::failing()));
        let err = service
            .nearest(NearestDoctorsDto {
                location: Some(vec![91.18, 23.46]),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }
}
