//! Floorplan add-on subscriptions and the per-place floorplan
//! entitlement derived from them.

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::models::feature_subscription::{
    CreateFeatureSubscription, FeatureKey, FeaturePlanKey, FeatureSubscription,
    FeatureSubscriptionStatus, SubscriptionScope, UpdateFeatureSubscription,
};
use lokal_core::repository::{
    FeatureSubscriptionRepository, FloorplanRepository, PlaceRepository, SiteRepository,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::EntitlementError;

/// Floorplans a usable subscription allows per place.
pub const FLOORPLANS_PER_PLACE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorplanStatus {
    /// No usable subscription covers the place.
    Locked,
    Active,
    LimitReached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorplanEntitlement {
    /// A usable subscription covers the place.
    pub entitled: bool,
    pub status: FloorplanStatus,
    pub limit: u32,
    pub used: u64,
    pub subscription_id: Option<Uuid>,
}

/// Pick the subscription governing `place_id` at `now`.
///
/// `subscriptions` must be ordered newest first. A usable place-scope
/// subscription for the place wins over any site-scope one.
pub fn governing_subscription(
    subscriptions: &[FeatureSubscription],
    place_id: Uuid,
    now: DateTime<Utc>,
) -> Option<&FeatureSubscription> {
    let usable = || subscriptions.iter().filter(move |s| s.is_usable_at(now));
    usable()
        .find(|s| s.scope == SubscriptionScope::Place && s.place_id == Some(place_id))
        .or_else(|| usable().find(|s| s.scope == SubscriptionScope::Site))
}

/// Compare the governing subscription against the floorplans in use.
pub fn floorplan_entitlement(
    subscription: Option<&FeatureSubscription>,
    used: u64,
) -> FloorplanEntitlement {
    let Some(subscription) = subscription else {
        return FloorplanEntitlement {
            entitled: false,
            status: FloorplanStatus::Locked,
            limit: 0,
            used,
            subscription_id: None,
        };
    };

    let status = if used >= u64::from(FLOORPLANS_PER_PLACE) {
        FloorplanStatus::LimitReached
    } else {
        FloorplanStatus::Active
    };
    FloorplanEntitlement {
        entitled: true,
        status,
        limit: FLOORPLANS_PER_PLACE,
        used,
        subscription_id: Some(subscription.id),
    }
}

fn validate_scope(scope: SubscriptionScope, place_id: Option<Uuid>) -> Result<(), EntitlementError> {
    match (scope, place_id) {
        (SubscriptionScope::Place, None) => {
            Err(EntitlementError::InvalidScope("place scope requires place_id"))
        }
        (SubscriptionScope::Site, Some(_)) => {
            Err(EntitlementError::InvalidScope("site scope must not set place_id"))
        }
        _ => Ok(()),
    }
}

fn validate_limit(plan_key: FeaturePlanKey, limit: Option<u32>) -> Result<(), EntitlementError> {
    match (plan_key, limit) {
        (FeaturePlanKey::FpCustom, None | Some(0)) => Err(EntitlementError::MissingFloorplanLimit),
        _ => Ok(()),
    }
}

fn validate_period(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), EntitlementError> {
    if end <= start {
        return Err(EntitlementError::InvalidPeriod);
    }
    Ok(())
}

/// Feature subscription service.
pub struct FeatureSubscriptionService<S, F, P, FP>
where
    S: SiteRepository,
    F: FeatureSubscriptionRepository,
    P: PlaceRepository,
    FP: FloorplanRepository,
{
    site_repo: S,
    subscription_repo: F,
    place_repo: P,
    floorplan_repo: FP,
}

impl<S, F, P, FP> FeatureSubscriptionService<S, F, P, FP>
where
    S: SiteRepository,
    F: FeatureSubscriptionRepository,
    P: PlaceRepository,
    FP: FloorplanRepository,
{
    pub fn new(site_repo: S, subscription_repo: F, place_repo: P, floorplan_repo: FP) -> Self {
        Self {
            site_repo,
            subscription_repo,
            place_repo,
            floorplan_repo,
        }
    }

    pub async fn create(&self, input: CreateFeatureSubscription) -> LokalResult<FeatureSubscription> {
        validate_scope(input.scope, input.place_id)?;
        validate_limit(input.plan_key, input.floorplan_limit)?;
        self.site_repo.get_by_id(input.site_id).await?;
        if let Some(place_id) = input.place_id {
            self.place_repo.get_by_id(input.site_id, place_id).await?;
        }
        if let Some(end) = input.current_period_end {
            validate_period(input.current_period_start.unwrap_or_else(Utc::now), end)?;
        }

        self.ensure_no_active_duplicate(
            input.site_id,
            input.feature_key,
            input.plan_key,
            input.scope,
            input.place_id,
            None,
        )
        .await?;

        let subscription = self.subscription_repo.create(input).await?;
        info!(
            site_id = %subscription.site_id,
            id = %subscription.id,
            scope = subscription.scope.as_str(),
            "Feature subscription created"
        );
        Ok(subscription)
    }

    pub async fn get(&self, site_id: Uuid, id: Uuid) -> LokalResult<FeatureSubscription> {
        self.subscription_repo.get_by_id(site_id, id).await
    }

    pub async fn list_by_site(&self, site_id: Uuid) -> LokalResult<Vec<FeatureSubscription>> {
        self.subscription_repo.list_by_site(site_id).await
    }

    /// Change plan, billing period, limit or period end. Status changes
    /// are rejected here; they go through cancel, suspend and resume.
    pub async fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        mut input: UpdateFeatureSubscription,
    ) -> LokalResult<FeatureSubscription> {
        input.status = None;
        input.canceled_at = None;

        let current = self.subscription_repo.get_by_id(site_id, id).await?;
        validate_limit(
            input.plan_key.unwrap_or(current.plan_key),
            input.floorplan_limit.or(current.floorplan_limit),
        )?;
        if let Some(end) = input.current_period_end {
            validate_period(current.current_period_start, end)?;
        }
        let new_plan = input.plan_key.filter(|key| *key != current.plan_key);
        if let (Some(plan_key), FeatureSubscriptionStatus::Active) = (new_plan, current.status) {
            self.ensure_no_active_duplicate(
                site_id,
                current.feature_key,
                plan_key,
                current.scope,
                current.place_id,
                Some(id),
            )
            .await?;
        }

        self.subscription_repo.update(site_id, id, input).await
    }

    /// Soft cancel: the subscription stays usable until its period ends.
    pub async fn cancel(&self, site_id: Uuid, id: Uuid) -> LokalResult<FeatureSubscription> {
        let current = self.subscription_repo.get_by_id(site_id, id).await?;
        if matches!(
            current.status,
            FeatureSubscriptionStatus::Canceled | FeatureSubscriptionStatus::Expired
        ) {
            return Err(EntitlementError::InvalidTransition {
                action: "cancel",
                from: current.status,
            }
            .into());
        }

        self.transition(
            site_id,
            id,
            FeatureSubscriptionStatus::Canceled,
            Some(Utc::now()),
        )
        .await
    }

    pub async fn suspend(&self, site_id: Uuid, id: Uuid) -> LokalResult<FeatureSubscription> {
        let current = self.subscription_repo.get_by_id(site_id, id).await?;
        if !matches!(
            current.status,
            FeatureSubscriptionStatus::Active | FeatureSubscriptionStatus::Canceled
        ) {
            return Err(EntitlementError::InvalidTransition {
                action: "suspend",
                from: current.status,
            }
            .into());
        }

        self.transition(site_id, id, FeatureSubscriptionStatus::Suspended, current.canceled_at)
            .await
    }

    pub async fn resume(&self, site_id: Uuid, id: Uuid) -> LokalResult<FeatureSubscription> {
        let current = self.subscription_repo.get_by_id(site_id, id).await?;
        if !matches!(
            current.status,
            FeatureSubscriptionStatus::Suspended | FeatureSubscriptionStatus::Canceled
        ) {
            return Err(EntitlementError::InvalidTransition {
                action: "resume",
                from: current.status,
            }
            .into());
        }
        if current.current_period_end <= Utc::now() {
            return Err(EntitlementError::PeriodEnded { action: "resume" }.into());
        }
        self.ensure_no_active_duplicate(
            site_id,
            current.feature_key,
            current.plan_key,
            current.scope,
            current.place_id,
            Some(id),
        )
        .await?;

        self.transition(site_id, id, FeatureSubscriptionStatus::Active, None)
            .await
    }

    /// Reject a second `ACTIVE` subscription with the same feature, plan
    /// and scope. `exclude` skips the subscription being changed.
    async fn ensure_no_active_duplicate(
        &self,
        site_id: Uuid,
        feature_key: FeatureKey,
        plan_key: FeaturePlanKey,
        scope: SubscriptionScope,
        place_id: Option<Uuid>,
        exclude: Option<Uuid>,
    ) -> LokalResult<()> {
        let existing = self
            .subscription_repo
            .list_for_feature(site_id, feature_key)
            .await?;
        let duplicate = existing.iter().any(|s| {
            Some(s.id) != exclude
                && s.status == FeatureSubscriptionStatus::Active
                && s.plan_key == plan_key
                && s.scope == scope
                && s.place_id == place_id
        });
        if duplicate {
            warn!(%site_id, plan_key = plan_key.as_str(), "Rejected duplicate feature subscription");
            return Err(EntitlementError::DuplicateSubscription.into());
        }
        Ok(())
    }

    async fn transition(
        &self,
        site_id: Uuid,
        id: Uuid,
        status: FeatureSubscriptionStatus,
        canceled_at: Option<DateTime<Utc>>,
    ) -> LokalResult<FeatureSubscription> {
        let updated = self
            .subscription_repo
            .update(
                site_id,
                id,
                UpdateFeatureSubscription {
                    status: Some(status),
                    canceled_at: Some(canceled_at),
                    ..Default::default()
                },
            )
            .await?;
        info!(%site_id, %id, %status, "Feature subscription status changed");
        Ok(updated)
    }

    pub async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.subscription_repo.delete(site_id, id).await?;
        info!(%site_id, %id, "Feature subscription deleted");
        Ok(())
    }

    /// Floorplan entitlement of a place at the current instant.
    pub async fn get_floorplan_entitlement(
        &self,
        site_id: Uuid,
        place_id: Uuid,
    ) -> LokalResult<FloorplanEntitlement> {
        let (subscriptions, used) = tokio::try_join!(
            self.subscription_repo
                .list_for_feature(site_id, FeatureKey::Floorplans),
            self.floorplan_repo.count_by_place(site_id, place_id),
        )?;

        let governing = governing_subscription(&subscriptions, place_id, Utc::now());
        let entitlement = floorplan_entitlement(governing, used);
        debug!(
            %site_id,
            %place_id,
            status = ?entitlement.status,
            used,
            "Floorplan entitlement"
        );
        Ok(entitlement)
    }
}
