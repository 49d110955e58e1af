use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::facilities::dtos::{
    CreateFacilityDto, FacilityResponseDto, ListFacilitiesQuery, NearestFacilitiesDto,
    UpdateFacilityDto,
};
use crate::features::locations::dtos::{NearestRequest, NearestResponseDto};
use crate::features::locations::models::{
    to_attributes, Attributes, Collection, ListFilter, LocatedEntity, LocationPatch,
};
use crate::features::locations::{GeoError, LocationStore, ProximityService};
use crate::shared::types::PaginationQuery;

/// Health facility map: CRUD over the facility collection plus nearest search
pub struct FacilityService {
    store: Arc<dyn LocationStore>,
    proximity: Arc<ProximityService>,
    max_limit: usize,
}

impl FacilityService {
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

    pub async fn create(&self, dto: CreateFacilityDto) -> Result<FacilityResponseDto> {
        let (point, facility_type, profile) = dto.into_parts()?;

        let entity = LocatedEntity::new(
            Collection::Facility,
            point,
            facility_type.as_str(),
            to_attributes(&profile)?,
        );

        let facility = self.store.insert(entity).await?;

        tracing::info!(
            "Facility created: id={}, type={}",
            facility.id,
            facility.category
        );

        Ok(facility.into())
    }

    pub async fn list(
        &self,
        query: ListFacilitiesQuery,
    ) -> Result<(Vec<FacilityResponseDto>, i64)> {
        let mut containment = Attributes::new();
        if let Some(district) = query.district.filter(|d| !d.is_empty()) {
            containment.insert("district".to_string(), json!(district));
        }
        if let Some(division) = query.division.filter(|d| !d.is_empty()) {
            containment.insert("division".to_string(), json!(division));
        }

        let filter = ListFilter {
            category: query.facility_type.filter(|t| !t.is_empty()),
            active: Some(query.active.unwrap_or(true)),
            attributes: (!containment.is_empty()).then_some(containment),
        };
        let page = PaginationQuery::new(query.page, query.page_size);

        let (facilities, total) = self
            .store
            .list(Collection::Facility, &filter, &page)
            .await?;

        Ok((facilities.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: Uuid) -> Result<FacilityResponseDto> {
        let facility = self
            .store
            .get(Collection::Facility, id)
            .await
            .map_err(|e| not_found(e, id))?;

        Ok(facility.into())
    }

    pub async fn update(&self, id: Uuid, dto: UpdateFacilityDto) -> Result<FacilityResponseDto> {
        let patch = dto.into_patch()?;
        if patch.is_empty() {
            let facility = self
                .store
                .get(Collection::Facility, id)
                .await
                .map_err(|e| not_found(e, id))?;
            return Ok(facility.into());
        }

        let facility = self
            .store
            .update(Collection::Facility, id, patch)
            .await
            .map_err(|e| not_found(e, id))?;

        tracing::info!("Facility updated: id={}", facility.id);

        Ok(facility.into())
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<FacilityResponseDto> {
        let facility = self
            .store
            .update(Collection::Facility, id, LocationPatch::deactivate())
            .await
            .map_err(|e| not_found(e, id))?;

        tracing::info!("Facility deactivated: id={}", facility.id);

        Ok(facility.into())
    }

    pub async fn nearest(
        &self,
        dto: NearestFacilitiesDto,
    ) -> Result<NearestResponseDto<FacilityResponseDto>> {
        let (point, options) = NearestRequest::from(dto).parse(self.max_limit)?;

        let results = self
            .proximity
            .query_nearest(Collection::Facility, point, &options)
            .await?;

        Ok(NearestResponseDto::new(point, &options, results))
    }
}

fn not_found(err: GeoError, id: Uuid) -> AppError {
    match err {
        GeoError::NotFound(_) => AppError::NotFound(format!("Facility with id {} not found", id)),
        other => other.into(),
    }
}
