//! Entitlement and resolution error types.

use lokal_core::error::LokalError;
use lokal_core::models::feature_subscription::FeatureSubscriptionStatus;
use lokal_core::models::legal_page::LegalPageKey;
use lokal_core::models::site_subscription::SubscriptionStatus;
use lokal_core::plan::LimitKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("site subscription is {0}")]
    SubscriptionNotUsable(SubscriptionStatus),

    #[error("plan limit reached for {kind:?}: {used} of {limit} used")]
    LimitReached { kind: LimitKind, limit: u32, used: u64 },

    #[error("{0} feature is locked")]
    FeatureLocked(&'static str),

    #[error("floorplan limit reached for this place: {used} of {limit} used")]
    FloorplanLimitReached { limit: u32, used: u64 },

    #[error("invalid subscription scope: {0}")]
    InvalidScope(&'static str),

    #[error("FP_CUSTOM subscriptions require a positive floorplan_limit")]
    MissingFloorplanLimit,

    #[error("current_period_end must be after current_period_start")]
    InvalidPeriod,

    #[error("an active subscription with the same feature, plan and scope already exists")]
    DuplicateSubscription,

    #[error("cannot {action} a subscription in status {from}")]
    InvalidTransition {
        action: &'static str,
        from: FeatureSubscriptionStatus,
    },

    #[error("cannot {action} a subscription whose period has ended")]
    PeriodEnded { action: &'static str },

    #[error("invalid redirect target: {0}")]
    InvalidRedirect(&'static str),

    #[error("a jogi oldal nem található: {0}")]
    LegalPageNotFound(LegalPageKey),
}

impl From<EntitlementError> for LokalError {
    fn from(err: EntitlementError) -> Self {
        match err {
            EntitlementError::LegalPageNotFound(key) => LokalError::NotFound {
                entity: "jogi oldal".into(),
                id: key.to_string(),
            },
            other => LokalError::Validation {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_violations_are_validation_errors() {
        let err: LokalError = EntitlementError::MissingFloorplanLimit.into();
        assert!(matches!(err, LokalError::Validation { .. }));

        let err: LokalError = EntitlementError::FeatureLocked("floorplan").into();
        assert_eq!(
            err.to_string(),
            "Validation error: floorplan feature is locked"
        );
    }

    #[test]
    fn missing_legal_page_is_not_found() {
        let err: LokalError = EntitlementError::LegalPageNotFound(LegalPageKey::Terms).into();
        match err {
            LokalError::NotFound { entity, id } => {
                assert_eq!(entity, "jogi oldal");
                assert_eq!(id, "terms");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
