//! Feature gates: what the admin UI shows next to a place's featured
//! toggle, gallery uploader and floorplan editor.
//!
//! The gate functions are pure. [`PlaceUpsellService`] loads the counts
//! and entitlements they need.

use lokal_core::error::LokalResult;
use lokal_core::plan::Plan;
use lokal_core::repository::{
    FeatureSubscriptionRepository, FloorplanRepository, PlaceRepository, SiteRepository,
    SiteSubscriptionRepository, UsageRepository,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entitlements::{Entitlements, EntitlementsService};
use crate::feature_subscription::{
    FeatureSubscriptionService, FloorplanEntitlement, FloorplanStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    /// The site's plan does not include the feature.
    NotInPlan,
    /// The site subscription is expired or inactive.
    SubscriptionInactive,
    PlanLimitReached,
    /// No usable add-on subscription covers the place.
    NoAddOn,
    AddOnLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeCta {
    ViewPlans,
    UpgradePlan,
    RenewSubscription,
    BuyAddOn,
    ContactSales,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeCta {
    UnfeatureAnotherPlace,
    RemoveImages,
    ReplaceFloorplan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeatureGate {
    Enabled,
    Locked {
        reason: GateReason,
        upgrade_cta: UpgradeCta,
    },
    LimitReached {
        reason: GateReason,
        upgrade_cta: UpgradeCta,
        alternative_cta: AlternativeCta,
    },
}

impl FeatureGate {
    pub fn is_enabled(&self) -> bool {
        matches!(self, FeatureGate::Enabled)
    }
}

const NOT_IN_PLAN: FeatureGate = FeatureGate::Locked {
    reason: GateReason::NotInPlan,
    upgrade_cta: UpgradeCta::ViewPlans,
};

const SUBSCRIPTION_INACTIVE: FeatureGate = FeatureGate::Locked {
    reason: GateReason::SubscriptionInactive,
    upgrade_cta: UpgradeCta::RenewSubscription,
};

/// Gate for marking one more place as featured.
///
/// A plan without featured slots is locked whatever the current count.
pub fn featured_gate(entitlements: &Entitlements, current_featured: u64) -> FeatureGate {
    let max = entitlements.limits.featured_places_max;
    if max == 0 || !entitlements.features.featured_places {
        return NOT_IN_PLAN;
    }
    if !entitlements.is_usable() {
        return SUBSCRIPTION_INACTIVE;
    }
    if current_featured >= u64::from(max) {
        return FeatureGate::LimitReached {
            reason: GateReason::PlanLimitReached,
            upgrade_cta: UpgradeCta::UpgradePlan,
            alternative_cta: AlternativeCta::UnfeatureAnotherPlace,
        };
    }
    FeatureGate::Enabled
}

/// Gate for uploading one more gallery image to a place.
///
/// `place_limit` replaces the plan's `gallery_images_max` when set.
pub fn gallery_gate(
    entitlements: &Entitlements,
    current_images: u64,
    place_limit: Option<u32>,
) -> FeatureGate {
    if !entitlements.features.galleries {
        return NOT_IN_PLAN;
    }
    if !entitlements.is_usable() {
        return SUBSCRIPTION_INACTIVE;
    }
    let limit = place_limit.unwrap_or(entitlements.limits.gallery_images_max);
    if current_images >= u64::from(limit) {
        return FeatureGate::LimitReached {
            reason: GateReason::PlanLimitReached,
            upgrade_cta: UpgradeCta::UpgradePlan,
            alternative_cta: AlternativeCta::RemoveImages,
        };
    }
    FeatureGate::Enabled
}

/// Gate for adding a floorplan to a place.
///
/// FREE sites never get floorplans. Other plans defer to the add-on
/// subscription covering the place.
pub fn floorplan_gate(entitlements: &Entitlements, floorplan: &FloorplanEntitlement) -> FeatureGate {
    if entitlements.plan == Plan::Free || !entitlements.features.floorplans {
        return NOT_IN_PLAN;
    }
    match floorplan.status {
        FloorplanStatus::Locked => FeatureGate::Locked {
            reason: GateReason::NoAddOn,
            upgrade_cta: UpgradeCta::BuyAddOn,
        },
        FloorplanStatus::LimitReached => FeatureGate::LimitReached {
            reason: GateReason::AddOnLimitReached,
            upgrade_cta: UpgradeCta::ContactSales,
            alternative_cta: AlternativeCta::ReplaceFloorplan,
        },
        FloorplanStatus::Active => FeatureGate::Enabled,
    }
}

/// All gates of one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceGates {
    pub place_id: Uuid,
    pub featured: FeatureGate,
    pub gallery: FeatureGate,
    pub floorplan: FeatureGate,
}

pub struct PlaceUpsellService<S, SS, U, F, P, FP>
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
    usage_repo: U,
}

impl<S, SS, U, F, P, FP> PlaceUpsellService<S, SS, U, F, P, FP>
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
        usage_repo: U,
    ) -> Self {
        Self {
            entitlements,
            feature_subscriptions,
            place_repo,
            usage_repo,
        }
    }

    pub async fn place_gates(&self, site_id: Uuid, place_id: Uuid) -> LokalResult<PlaceGates> {
        let place = self.place_repo.get_by_id(site_id, place_id).await?;

        let (entitlements, images, floorplan) = tokio::try_join!(
            self.entitlements.get_by_site_id(site_id),
            self.usage_repo.count_place_gallery_images(site_id, place_id),
            self.feature_subscriptions
                .get_floorplan_entitlement(site_id, place_id),
        )?;

        // A place that is already featured holds its own slot.
        let other_featured = entitlements
            .usage
            .featured_places
            .saturating_sub(u64::from(place.is_featured));

        Ok(PlaceGates {
            place_id,
            featured: featured_gate(&entitlements, other_featured),
            gallery: gallery_gate(&entitlements, images, place.gallery_image_limit),
            floorplan: floorplan_gate(&entitlements, &floorplan),
        })
    }
}
