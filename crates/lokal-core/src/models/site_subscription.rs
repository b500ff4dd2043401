//! Site-level plan subscription.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LokalError;
use crate::plan::{Plan, PlanOverrides};

/// Stored status of a site subscription.
///
/// `Expired` is normally derived from `valid_until` rather than stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Inactive => "INACTIVE",
            SubscriptionStatus::Canceled => "CANCELED",
            SubscriptionStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "INACTIVE" => Ok(SubscriptionStatus::Inactive),
            "CANCELED" => Ok(SubscriptionStatus::Canceled),
            "EXPIRED" => Ok(SubscriptionStatus::Expired),
            other => Err(LokalError::validation(format!(
                "unknown subscription status: {other}"
            ))),
        }
    }
}

/// The plan a site is on. At most one per site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSubscription {
    pub id: Uuid,
    pub site_id: Uuid,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub valid_until: Option<DateTime<Utc>>,
    pub plan_overrides: Option<PlanOverrides>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteSubscription {
    /// Status as seen at `now`: a lapsed `valid_until` always wins.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        match self.valid_until {
            Some(until) if until < now => SubscriptionStatus::Expired,
            _ => self.status,
        }
    }
}

/// Create-or-replace input for a site's subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSiteSubscription {
    pub plan: Plan,
    /// Defaults to `ACTIVE`.
    pub status: Option<SubscriptionStatus>,
    pub valid_until: Option<DateTime<Utc>>,
    pub plan_overrides: Option<PlanOverrides>,
}
