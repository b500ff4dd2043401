//! SurrealDB implementation of [`FeatureSubscriptionRepository`].

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::models::feature_subscription::{
    CreateFeatureSubscription, FeatureKey, FeatureSubscription, FeatureSubscriptionStatus,
    UpdateFeatureSubscription,
};
use lokal_core::repository::FeatureSubscriptionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_row, parse_enum, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct FeatureSubscriptionRow {
    record_id: String,
    site_id: String,
    scope: String,
    place_id: Option<String>,
    feature_key: String,
    plan_key: String,
    billing_period: String,
    status: String,
    floorplan_limit: Option<u32>,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
    canceled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FeatureSubscriptionRow {
    fn try_into_subscription(self) -> Result<FeatureSubscription, DbError> {
        Ok(FeatureSubscription {
            id: parse_uuid(&self.record_id, "feature_subscription")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            scope: parse_enum(&self.scope)?,
            place_id: parse_opt_uuid(self.place_id, "place")?,
            feature_key: parse_enum(&self.feature_key)?,
            plan_key: parse_enum(&self.plan_key)?,
            billing_period: parse_enum(&self.billing_period)?,
            status: parse_enum(&self.status)?,
            floorplan_limit: self.floorplan_limit,
            current_period_start: self.current_period_start,
            current_period_end: self.current_period_end,
            canceled_at: self.canceled_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn collect(rows: Vec<FeatureSubscriptionRow>) -> Result<Vec<FeatureSubscription>, DbError> {
    rows.into_iter()
        .map(FeatureSubscriptionRow::try_into_subscription)
        .collect()
}

/// SurrealDB implementation of the FeatureSubscription repository.
#[derive(Clone)]
pub struct SurrealFeatureSubscriptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFeatureSubscriptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> FeatureSubscriptionRepository for SurrealFeatureSubscriptionRepository<C> {
    async fn create(&self, input: CreateFeatureSubscription) -> LokalResult<FeatureSubscription> {
        let id_str = Uuid::new_v4().to_string();
        let start = input.current_period_start.unwrap_or_else(Utc::now);
        let end = input
            .current_period_end
            .unwrap_or_else(|| input.billing_period.period_end(start));

        let result = self
            .db
            .query(
                "CREATE type::record('feature_subscription', $id) SET \
                 site_id = $site_id, scope = $scope, place_id = $place_id, \
                 feature_key = $feature_key, plan_key = $plan_key, \
                 billing_period = $billing_period, status = $status, \
                 floorplan_limit = $floorplan_limit, \
                 current_period_start = $current_period_start, \
                 current_period_end = $current_period_end; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('feature_subscription', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", input.site_id.to_string()))
            .bind(("scope", input.scope.as_str()))
            .bind(("place_id", input.place_id.map(|id| id.to_string())))
            .bind(("feature_key", input.feature_key.as_str()))
            .bind(("plan_key", input.plan_key.as_str()))
            .bind(("billing_period", input.billing_period.as_str()))
            .bind(("status", FeatureSubscriptionStatus::Active.as_str()))
            .bind(("floorplan_limit", input.floorplan_limit))
            .bind(("current_period_start", start))
            .bind(("current_period_end", end))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<FeatureSubscriptionRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "feature_subscription", &id_str)?.try_into_subscription()?)
    }

    async fn get_by_id(&self, site_id: Uuid, id: Uuid) -> LokalResult<FeatureSubscription> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('feature_subscription', $id) \
                 WHERE site_id = $site_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FeatureSubscriptionRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "feature_subscription", &id_str)?.try_into_subscription()?)
    }

    async fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateFeatureSubscription,
    ) -> LokalResult<FeatureSubscription> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.plan_key.is_some() {
            sets.push("plan_key = $plan_key");
        }
        if input.billing_period.is_some() {
            sets.push("billing_period = $billing_period");
        }
        if input.floorplan_limit.is_some() {
            sets.push("floorplan_limit = $floorplan_limit");
        }
        if input.current_period_end.is_some() {
            sets.push("current_period_end = $current_period_end");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.canceled_at.is_some() {
            sets.push("canceled_at = $canceled_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('feature_subscription', $id) SET {} \
             WHERE site_id = $site_id; \
             SELECT meta::id(id) AS record_id, * \
             FROM type::record('feature_subscription', $id) \
             WHERE site_id = $site_id;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()));
        if let Some(plan_key) = input.plan_key {
            builder = builder.bind(("plan_key", plan_key.as_str()));
        }
        if let Some(billing_period) = input.billing_period {
            builder = builder.bind(("billing_period", billing_period.as_str()));
        }
        if let Some(floorplan_limit) = input.floorplan_limit {
            builder = builder.bind(("floorplan_limit", floorplan_limit));
        }
        if let Some(end) = input.current_period_end {
            builder = builder.bind(("current_period_end", end));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(canceled_at) = input.canceled_at {
            builder = builder.bind(("canceled_at", canceled_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<FeatureSubscriptionRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "feature_subscription", &id_str)?.try_into_subscription()?)
    }

    async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        // Verify existence within the site first.
        self.get_by_id(site_id, id).await?;

        self.db
            .query("DELETE type::record('feature_subscription', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_site(&self, site_id: Uuid) -> LokalResult<Vec<FeatureSubscription>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM feature_subscription \
                 WHERE site_id = $site_id ORDER BY created_at DESC",
            )
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FeatureSubscriptionRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_for_feature(
        &self,
        site_id: Uuid,
        feature_key: FeatureKey,
    ) -> LokalResult<Vec<FeatureSubscription>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM feature_subscription \
                 WHERE site_id = $site_id AND feature_key = $feature_key \
                 ORDER BY created_at DESC",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("feature_key", feature_key.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FeatureSubscriptionRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }
}
