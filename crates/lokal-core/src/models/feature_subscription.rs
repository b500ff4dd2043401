//! Add-on feature subscriptions (floorplans).
//!
//! A feature subscription is independent of the site plan. It is either
//! scoped to the whole site or to a single place, and a place-scoped
//! subscription always wins over a site-scoped one for that place.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LokalError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionScope {
    Site,
    Place,
}

impl SubscriptionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionScope::Site => "site",
            SubscriptionScope::Place => "place",
        }
    }
}

impl FromStr for SubscriptionScope {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "site" => Ok(SubscriptionScope::Site),
            "place" => Ok(SubscriptionScope::Place),
            other => Err(LokalError::validation(format!("unknown scope: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureKey {
    Floorplans,
}

impl FeatureKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::Floorplans => "FLOORPLANS",
        }
    }
}

impl FromStr for FeatureKey {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FLOORPLANS" => Ok(FeatureKey::Floorplans),
            other => Err(LokalError::validation(format!("unknown feature key: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeaturePlanKey {
    FpStandard,
    /// Custom contract; requires an explicit `floorplan_limit`.
    FpCustom,
}

impl FeaturePlanKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeaturePlanKey::FpStandard => "FP_STANDARD",
            FeaturePlanKey::FpCustom => "FP_CUSTOM",
        }
    }
}

impl FromStr for FeaturePlanKey {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FP_STANDARD" => Ok(FeaturePlanKey::FpStandard),
            "FP_CUSTOM" => Ok(FeaturePlanKey::FpCustom),
            other => Err(LokalError::validation(format!("unknown plan key: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "MONTHLY",
            BillingPeriod::Yearly => "YEARLY",
        }
    }

    /// End of the first billing period starting at `start`.
    pub fn period_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        let months = match self {
            BillingPeriod::Monthly => Months::new(1),
            BillingPeriod::Yearly => Months::new(12),
        };
        start.checked_add_months(months).unwrap_or(start)
    }
}

impl FromStr for BillingPeriod {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONTHLY" => Ok(BillingPeriod::Monthly),
            "YEARLY" => Ok(BillingPeriod::Yearly),
            other => Err(LokalError::validation(format!(
                "unknown billing period: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureSubscriptionStatus {
    Active,
    /// Soft-cancelled: still usable until `current_period_end`.
    Canceled,
    Suspended,
    Expired,
}

impl FeatureSubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSubscriptionStatus::Active => "ACTIVE",
            FeatureSubscriptionStatus::Canceled => "CANCELED",
            FeatureSubscriptionStatus::Suspended => "SUSPENDED",
            FeatureSubscriptionStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for FeatureSubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureSubscriptionStatus {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(FeatureSubscriptionStatus::Active),
            "CANCELED" => Ok(FeatureSubscriptionStatus::Canceled),
            "SUSPENDED" => Ok(FeatureSubscriptionStatus::Suspended),
            "EXPIRED" => Ok(FeatureSubscriptionStatus::Expired),
            other => Err(LokalError::validation(format!(
                "unknown feature subscription status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSubscription {
    pub id: Uuid,
    pub site_id: Uuid,
    pub scope: SubscriptionScope,
    /// Set iff `scope` is `Place`.
    pub place_id: Option<Uuid>,
    pub feature_key: FeatureKey,
    pub plan_key: FeaturePlanKey,
    pub billing_period: BillingPeriod,
    pub status: FeatureSubscriptionStatus,
    pub floorplan_limit: Option<u32>,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeatureSubscription {
    /// Whether the subscription grants its feature at `now`.
    ///
    /// Active and cancelled subscriptions both count until the period
    /// ends; suspended and expired ones never do.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.status,
            FeatureSubscriptionStatus::Active | FeatureSubscriptionStatus::Canceled
        ) && self.current_period_end > now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeatureSubscription {
    pub site_id: Uuid,
    pub scope: SubscriptionScope,
    pub place_id: Option<Uuid>,
    pub feature_key: FeatureKey,
    pub plan_key: FeaturePlanKey,
    pub billing_period: BillingPeriod,
    pub floorplan_limit: Option<u32>,
    /// Defaults to now.
    pub current_period_start: Option<DateTime<Utc>>,
    /// Defaults to one billing period after the start.
    pub current_period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateFeatureSubscription {
    pub plan_key: Option<FeaturePlanKey>,
    pub billing_period: Option<BillingPeriod>,
    pub floorplan_limit: Option<u32>,
    pub current_period_end: Option<DateTime<Utc>>,
    /// Lifecycle changes go through cancel/suspend/resume only.
    #[serde(skip)]
    pub status: Option<FeatureSubscriptionStatus>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(skip)]
    pub canceled_at: Option<Option<DateTime<Utc>>>,
}
