//! SurrealDB implementation of [`SiteSubscriptionRepository`].
//!
//! Plan overrides are stored as a flexible object and parsed back into
//! the typed [`PlanOverrides`] on read; an empty object means "no
//! overrides".

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::models::site_subscription::{
    SiteSubscription, SubscriptionStatus, UpsertSiteSubscription,
};
use lokal_core::plan::PlanOverrides;
use lokal_core::repository::SiteSubscriptionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_row, parse_enum, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SiteSubscriptionRow {
    record_id: String,
    site_id: String,
    plan: String,
    status: String,
    valid_until: Option<DateTime<Utc>>,
    plan_overrides: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SiteSubscriptionRow {
    fn try_into_subscription(self) -> Result<SiteSubscription, DbError> {
        let overrides = PlanOverrides::from_json(self.plan_overrides)
            .map_err(|e| DbError::InvalidRow(e.to_string()))?;
        Ok(SiteSubscription {
            id: parse_uuid(&self.record_id, "site_subscription")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            plan: parse_enum(&self.plan)?,
            status: parse_enum(&self.status)?,
            valid_until: self.valid_until,
            plan_overrides: (!overrides.is_empty()).then_some(overrides),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the SiteSubscription repository.
#[derive(Clone)]
pub struct SurrealSiteSubscriptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSiteSubscriptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SiteSubscriptionRepository for SurrealSiteSubscriptionRepository<C> {
    async fn find_by_site(&self, site_id: Uuid) -> LokalResult<Option<SiteSubscription>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM site_subscription \
                 WHERE site_id = $site_id",
            )
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteSubscriptionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(SiteSubscriptionRow::try_into_subscription)
            .transpose()?)
    }

    async fn upsert(
        &self,
        site_id: Uuid,
        input: UpsertSiteSubscription,
    ) -> LokalResult<SiteSubscription> {
        let site_id_str = site_id.to_string();
        let status = input.status.unwrap_or(SubscriptionStatus::Active);
        let overrides = input.plan_overrides.unwrap_or_default().to_json();

        // The record id is derived from the site id, which makes the
        // one-subscription-per-site rule structural.
        let result = self
            .db
            .query(
                "UPSERT type::record('site_subscription', $site_id) SET \
                 site_id = $site_id, plan = $plan, status = $status, \
                 valid_until = $valid_until, \
                 plan_overrides = $plan_overrides, \
                 updated_at = time::now(); \
                 SELECT meta::id(id) AS record_id, * FROM site_subscription \
                 WHERE site_id = $site_id;",
            )
            .bind(("site_id", site_id_str.clone()))
            .bind(("plan", input.plan.as_str()))
            .bind(("status", status.as_str()))
            .bind(("valid_until", input.valid_until))
            .bind(("plan_overrides", overrides))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<SiteSubscriptionRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "site_subscription", &site_id_str)?.try_into_subscription()?)
    }

    async fn delete(&self, site_id: Uuid) -> LokalResult<()> {
        self.db
            .query("DELETE site_subscription WHERE site_id = $site_id")
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
