//! Service configuration, read once at startup and injected.

use lokal_core::models::site_subscription::SubscriptionStatus;
use lokal_core::plan::Plan;

/// Configuration shared by the entitlement and resolver services.
#[derive(Debug, Clone)]
pub struct EntitlementsConfig {
    /// Plan assumed for sites without a subscription row (default: BASIC).
    pub default_plan: Plan,
    /// Status assumed for sites without a subscription row (default: ACTIVE).
    pub default_status: SubscriptionStatus,
    /// Site served when a request carries no site key. `None` makes such
    /// requests fail with `NotFound`.
    pub default_site_slug: Option<String>,
}

impl Default for EntitlementsConfig {
    fn default() -> Self {
        Self {
            default_plan: Plan::Basic,
            default_status: SubscriptionStatus::Active,
            default_site_slug: None,
        }
    }
}
