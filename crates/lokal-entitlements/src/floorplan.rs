//! Floorplan and pin management, gated by the floorplan add-on.

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::models::floorplan::{
    CreateFloorplan, CreatePin, FloorplanPin, PlaceFloorplan, UpdateFloorplan, UpdatePin,
    validate_coordinate,
};
use lokal_core::plan::Plan;
use lokal_core::repository::{
    FeatureSubscriptionRepository, FloorplanRepository, PlaceRepository, SiteRepository,
    SiteSubscriptionRepository, UsageRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entitlements::EntitlementsService;
use crate::error::EntitlementError;
use crate::feature_subscription::{FeatureSubscriptionService, FloorplanStatus};

pub struct FloorplanService<S, SS, U, F, P, FP>
where
    S: SiteRepository,
    SS: SiteSubscriptionRepository,
    U: UsageRepository,
    F: FeatureSubscriptionRepository,
    P: PlaceRepository,
    FP: FloorplanRepository,
{
    entitlements: EntitlementsService<S, SS, U>,
    feature_subscriptions: FeatureSubscriptionService<S, F, P, FP>,
    place_repo: P,
    floorplan_repo: FP,
}

impl<S, SS, U, F, P, FP> FloorplanService<S, SS, U, F, P, FP>
where
    S: SiteRepository,
    SS: SiteSubscriptionRepository,
    U: UsageRepository,
    F: FeatureSubscriptionRepository,
    P: PlaceRepository,
    FP: FloorplanRepository,
{
    pub fn new(
        entitlements: EntitlementsService<S, SS, U>,
        feature_subscriptions: FeatureSubscriptionService<S, F, P, FP>,
        place_repo: P,
        floorplan_repo: FP,
    ) -> Self {
        Self {
            entitlements,
            feature_subscriptions,
            place_repo,
            floorplan_repo,
        }
    }

    /// Add a floorplan to a place. The site plan must include floorplans
    /// (FREE never does) and the place needs an `active` floorplan
    /// entitlement.
    pub async fn create(&self, input: CreateFloorplan) -> LokalResult<PlaceFloorplan> {
        if input.title.trim().is_empty() || input.image_url.trim().is_empty() {
            return Err(LokalError::validation("title and image_url are required"));
        }
        self.place_repo.get_by_id(input.site_id, input.place_id).await?;

        let (site, entitlement) = tokio::try_join!(
            self.entitlements.get_by_site_id(input.site_id),
            self.feature_subscriptions
                .get_floorplan_entitlement(input.site_id, input.place_id),
        )?;
        if site.plan == Plan::Free || !site.features.floorplans {
            warn!(site_id = %input.site_id, plan = site.plan.as_str(), "Rejected floorplan: not in plan");
            return Err(EntitlementError::FeatureLocked("floorplan").into());
        }
        match entitlement.status {
            FloorplanStatus::Active => {}
            FloorplanStatus::Locked => {
                warn!(site_id = %input.site_id, place_id = %input.place_id, "Rejected floorplan: feature locked");
                return Err(EntitlementError::FeatureLocked("floorplan").into());
            }
            FloorplanStatus::LimitReached => {
                warn!(site_id = %input.site_id, place_id = %input.place_id, "Rejected floorplan: limit reached");
                return Err(EntitlementError::FloorplanLimitReached {
                    limit: entitlement.limit,
                    used: entitlement.used,
                }
                .into());
            }
        }

        let floorplan = self.floorplan_repo.create(input).await?;
        info!(site_id = %floorplan.site_id, id = %floorplan.id, "Floorplan created");
        Ok(floorplan)
    }

    pub async fn get(&self, site_id: Uuid, id: Uuid) -> LokalResult<PlaceFloorplan> {
        self.floorplan_repo.get_by_id(site_id, id).await
    }

    pub async fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateFloorplan,
    ) -> LokalResult<PlaceFloorplan> {
        self.floorplan_repo.update(site_id, id, input).await
    }

    pub async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.floorplan_repo.delete(site_id, id).await?;
        info!(%site_id, %id, "Floorplan deleted");
        Ok(())
    }

    pub async fn list_by_place(&self, site_id: Uuid, place_id: Uuid) -> LokalResult<Vec<PlaceFloorplan>> {
        self.place_repo.get_by_id(site_id, place_id).await?;
        self.floorplan_repo.list_by_place(site_id, place_id).await
    }

    pub async fn create_pin(&self, input: CreatePin) -> LokalResult<FloorplanPin> {
        validate_coordinate("x", input.x)?;
        validate_coordinate("y", input.y)?;
        self.floorplan_repo
            .get_by_id(input.site_id, input.floorplan_id)
            .await?;
        self.floorplan_repo.create_pin(input).await
    }

    pub async fn update_pin(
        &self,
        site_id: Uuid,
        floorplan_id: Uuid,
        id: Uuid,
        input: UpdatePin,
    ) -> LokalResult<FloorplanPin> {
        if let Some(x) = input.x {
            validate_coordinate("x", x)?;
        }
        if let Some(y) = input.y {
            validate_coordinate("y", y)?;
        }
        self.pin_of(site_id, floorplan_id, id).await?;
        self.floorplan_repo.update_pin(site_id, id, input).await
    }

    pub async fn delete_pin(&self, site_id: Uuid, floorplan_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.pin_of(site_id, floorplan_id, id).await?;
        self.floorplan_repo.delete_pin(site_id, id).await
    }

    pub async fn list_pins(&self, site_id: Uuid, floorplan_id: Uuid) -> LokalResult<Vec<FloorplanPin>> {
        self.floorplan_repo.get_by_id(site_id, floorplan_id).await?;
        self.floorplan_repo.list_pins(site_id, floorplan_id).await
    }

    /// Load a pin, requiring it to sit on `floorplan_id`.
    async fn pin_of(&self, site_id: Uuid, floorplan_id: Uuid, id: Uuid) -> LokalResult<FloorplanPin> {
        let pin = self.floorplan_repo.get_pin(site_id, id).await?;
        if pin.floorplan_id != floorplan_id {
            return Err(LokalError::not_found("floorplan pin", id));
        }
        Ok(pin)
    }
}
