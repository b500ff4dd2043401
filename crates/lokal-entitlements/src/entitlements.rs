//! Entitlement resolution: plan defaults, per-site overrides and live
//! usage combined into one [`Entitlements`] value.
//!
//! Nothing is cached. Every call reloads the subscription and recounts
//! usage, so the result always reflects the database at call time.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use lokal_core::error::{LokalError, LokalResult};
use lokal_core::models::site_subscription::{
    SiteSubscription, SubscriptionStatus, UpsertSiteSubscription,
};
use lokal_core::plan::{
    Feature, LimitKind, Plan, PlanDefinition, PlanFeatures, PlanLimits, UNLIMITED,
};
use lokal_core::repository::{SiteRepository, SiteSubscriptionRepository, UsageRepository};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EntitlementsConfig;
use crate::error::EntitlementError;

/// Live resource counts for a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub places: u64,
    pub featured_places: u64,
    /// Events starting in the current calendar month (UTC).
    pub events_this_month: u64,
    pub members: u64,
    pub domain_aliases: u64,
    /// Distinct languages with an active site key.
    pub languages: u64,
    pub galleries: u64,
}

impl Usage {
    pub fn get(&self, kind: LimitKind) -> u64 {
        match kind {
            LimitKind::Places => self.places,
            LimitKind::FeaturedPlaces => self.featured_places,
            LimitKind::EventsPerMonth => self.events_this_month,
            LimitKind::Members => self.members,
            LimitKind::DomainAliases => self.domain_aliases,
            LimitKind::Languages => self.languages,
            LimitKind::Galleries => self.galleries,
        }
    }
}

/// The resolved plan, limits, features and usage of a site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entitlements {
    pub site_id: Uuid,
    pub plan: Plan,
    /// Effective status: a lapsed `valid_until` reads as `EXPIRED`.
    pub status: SubscriptionStatus,
    pub valid_until: Option<DateTime<Utc>>,
    /// `false` when the configured default was used.
    pub has_subscription: bool,
    pub limits: PlanLimits,
    pub features: PlanFeatures,
    pub usage: Usage,
}

impl Entitlements {
    /// Active and cancelled subscriptions keep their entitlements;
    /// inactive and expired ones grant nothing new.
    pub fn is_usable(&self) -> bool {
        matches!(
            self.status,
            SubscriptionStatus::Active | SubscriptionStatus::Canceled
        )
    }

    pub fn is_feature_enabled(&self, feature: Feature) -> bool {
        self.is_usable() && self.features.is_enabled(feature)
    }

    /// Remaining headroom for `kind`, or `None` when unlimited.
    pub fn remaining(&self, kind: LimitKind) -> Option<u64> {
        let limit = self.limits.get(kind);
        if limit == UNLIMITED {
            return None;
        }
        Some(u64::from(limit).saturating_sub(self.usage.get(kind)))
    }
}

/// `[start, end)` of the calendar month containing `now`, in UTC.
pub fn month_bounds(now: DateTime<Utc>) -> LokalResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(|| LokalError::Internal("invalid month start".into()))?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| LokalError::Internal("month end out of range".into()))?;
    Ok((start, end))
}

/// Entitlement service.
///
/// Generic over repository implementations so that it has no
/// dependency on the database crate.
pub struct EntitlementsService<S, SS, U>
where
    S: SiteRepository,
    SS: SiteSubscriptionRepository,
    U: UsageRepository,
{
    site_repo: S,
    subscription_repo: SS,
    usage_repo: U,
    config: EntitlementsConfig,
}

impl<S, SS, U> EntitlementsService<S, SS, U>
where
    S: SiteRepository,
    SS: SiteSubscriptionRepository,
    U: UsageRepository,
{
    pub fn new(
        site_repo: S,
        subscription_repo: SS,
        usage_repo: U,
        config: EntitlementsConfig,
    ) -> Self {
        Self {
            site_repo,
            subscription_repo,
            usage_repo,
            config,
        }
    }

    /// Resolve the entitlements of a site at the current instant.
    pub async fn get_by_site_id(&self, site_id: Uuid) -> LokalResult<Entitlements> {
        let now = Utc::now();
        let subscription = self.subscription_repo.find_by_site(site_id).await?;

        let (plan, status, valid_until, overrides) = match &subscription {
            Some(sub) => (
                sub.plan,
                sub.effective_status(now),
                sub.valid_until,
                sub.plan_overrides.clone(),
            ),
            None => {
                debug!(
                    %site_id,
                    plan = %self.config.default_plan,
                    "No subscription, using default plan"
                );
                (self.config.default_plan, self.config.default_status, None, None)
            }
        };

        let mut definition = PlanDefinition::for_plan(plan);
        if let Some(overrides) = &overrides {
            definition = definition.with_overrides(overrides);
        }

        let usage = self.usage(site_id, now).await?;

        Ok(Entitlements {
            site_id,
            plan,
            status,
            valid_until,
            has_subscription: subscription.is_some(),
            limits: definition.limits,
            features: definition.features,
            usage,
        })
    }

    /// Count everything the plan limits, concurrently.
    async fn usage(&self, site_id: Uuid, now: DateTime<Utc>) -> LokalResult<Usage> {
        let (month_start, month_end) = month_bounds(now)?;

        let (
            places,
            featured_places,
            events_this_month,
            members,
            domain_aliases,
            languages,
            galleries,
        ) = tokio::try_join!(
            self.usage_repo.count_places(site_id),
            self.usage_repo.count_featured_places(site_id),
            self.usage_repo
                .count_events_between(site_id, month_start, month_end),
            self.usage_repo.count_members(site_id),
            self.usage_repo.count_domain_aliases(site_id),
            self.usage_repo.count_languages(site_id),
            self.usage_repo.count_galleries(site_id),
        )?;

        Ok(Usage {
            places,
            featured_places,
            events_this_month,
            members,
            domain_aliases,
            languages,
            galleries,
        })
    }

    /// Fail unless one more `kind` fits into the site's plan.
    pub async fn check_limit(&self, site_id: Uuid, kind: LimitKind) -> LokalResult<Entitlements> {
        let entitlements = self.get_by_site_id(site_id).await?;

        if !entitlements.is_usable() {
            warn!(%site_id, status = %entitlements.status, "Rejected write: subscription not usable");
            return Err(EntitlementError::SubscriptionNotUsable(entitlements.status).into());
        }

        if entitlements.remaining(kind) == Some(0) {
            let limit = entitlements.limits.get(kind);
            let used = entitlements.usage.get(kind);
            warn!(%site_id, ?kind, limit, used, "Rejected write: plan limit reached");
            return Err(EntitlementError::LimitReached { kind, limit, used }.into());
        }

        Ok(entitlements)
    }

    /// The stored subscription of a site, if any.
    pub async fn get_subscription(&self, site_id: Uuid) -> LokalResult<Option<SiteSubscription>> {
        self.site_repo.get_by_id(site_id).await?;
        self.subscription_repo.find_by_site(site_id).await
    }

    /// Create or replace the subscription of an existing site.
    pub async fn set_subscription(
        &self,
        site_id: Uuid,
        input: UpsertSiteSubscription,
    ) -> LokalResult<SiteSubscription> {
        self.site_repo.get_by_id(site_id).await?;

        let plan = input.plan;
        let subscription = self.subscription_repo.upsert(site_id, input).await?;
        info!(%site_id, %plan, status = %subscription.status, "Site subscription updated");
        Ok(subscription)
    }
}
