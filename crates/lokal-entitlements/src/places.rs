//! Place management with plan limit enforcement.

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::models::place::{CreatePlace, Place, UpdatePlace};
use lokal_core::plan::LimitKind;
use lokal_core::repository::{
    PaginatedResult, Pagination, PlaceRepository, SiteRepository, SiteSubscriptionRepository,
    UsageRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::entitlements::EntitlementsService;

pub struct PlaceService<S, SS, U, P>
where
    S: SiteRepository,
    SS: SiteSubscriptionRepository,
    U: UsageRepository,
    P: PlaceRepository,
{
    entitlements: EntitlementsService<S, SS, U>,
    place_repo: P,
}

impl<S, SS, U, P> PlaceService<S, SS, U, P>
where
    S: SiteRepository,
    SS: SiteSubscriptionRepository,
    U: UsageRepository,
    P: PlaceRepository,
{
    pub fn new(entitlements: EntitlementsService<S, SS, U>, place_repo: P) -> Self {
        Self {
            entitlements,
            place_repo,
        }
    }

    pub async fn create(&self, input: CreatePlace) -> LokalResult<Place> {
        if input.name.trim().is_empty() {
            return Err(LokalError::validation("place name must not be empty"));
        }
        self.entitlements
            .check_limit(input.site_id, LimitKind::Places)
            .await?;
        if input.is_featured {
            self.entitlements
                .check_limit(input.site_id, LimitKind::FeaturedPlaces)
                .await?;
        }

        let place = self.place_repo.create(input).await?;
        info!(site_id = %place.site_id, id = %place.id, "Place created");
        Ok(place)
    }

    pub async fn get(&self, site_id: Uuid, id: Uuid) -> LokalResult<Place> {
        self.place_repo.get_by_id(site_id, id).await
    }

    /// Featuring a place that is not featured yet needs a free slot.
    pub async fn update(&self, site_id: Uuid, id: Uuid, input: UpdatePlace) -> LokalResult<Place> {
        let current = self.place_repo.get_by_id(site_id, id).await?;
        if input.is_featured == Some(true) && !current.is_featured {
            self.entitlements
                .check_limit(site_id, LimitKind::FeaturedPlaces)
                .await?;
        }
        self.place_repo.update(site_id, id, input).await
    }

    pub async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.place_repo.delete(site_id, id).await
    }

    pub async fn list(
        &self,
        site_id: Uuid,
        pagination: Pagination,
    ) -> LokalResult<PaginatedResult<Place>> {
        self.place_repo.list(site_id, pagination).await
    }
}
