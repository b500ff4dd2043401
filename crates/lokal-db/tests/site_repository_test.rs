//! Integration tests for Site, SiteSubscription and FeatureSubscription
//! repositories using in-memory SurrealDB.

use chrono::{Duration, TimeZone, Utc};
use lokal_core::error::LokalError;
use lokal_core::models::feature_subscription::{
    BillingPeriod, CreateFeatureSubscription, FeatureKey, FeaturePlanKey,
    FeatureSubscriptionStatus, SubscriptionScope, UpdateFeatureSubscription,
};
use lokal_core::models::site::{CreateSite, UpdateSite};
use lokal_core::models::site_subscription::{SubscriptionStatus, UpsertSiteSubscription};
use lokal_core::plan::{LimitOverrides, Plan, PlanOverrides};
use lokal_core::repository::{
    FeatureSubscriptionRepository, Pagination, SiteRepository, SiteSubscriptionRepository,
};
use lokal_db::repository::{
    SurrealFeatureSubscriptionRepository, SurrealSiteRepository,
    SurrealSiteSubscriptionRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();
    db
}

fn new_site(slug: &str) -> CreateSite {
    CreateSite {
        slug: slug.into(),
        name: format!("{slug} site"),
        primary_domain: None,
        is_active: None,
    }
}

// -----------------------------------------------------------------------
// Sites
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_site() {
    let db = setup().await;
    let repo = SurrealSiteRepository::new(db);

    let site = repo.create(new_site("tihany")).await.unwrap();
    assert_eq!(site.slug, "tihany");
    assert!(site.is_active);

    let fetched = repo.get_by_id(site.id).await.unwrap();
    assert_eq!(fetched.id, site.id);
    assert_eq!(fetched.name, "tihany site");

    let by_slug = repo.find_by_slug("tihany").await.unwrap().unwrap();
    assert_eq!(by_slug.id, site.id);
    assert!(repo.find_by_slug("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_site_slug_is_already_exists() {
    let db = setup().await;
    let repo = SurrealSiteRepository::new(db);

    repo.create(new_site("eger")).await.unwrap();
    let err = repo.create(new_site("eger")).await.unwrap_err();
    assert!(matches!(err, LokalError::AlreadyExists { .. }), "{err:?}");
}

#[tokio::test]
async fn update_site_clears_primary_domain() {
    let db = setup().await;
    let repo = SurrealSiteRepository::new(db);

    let site = repo
        .create(CreateSite {
            primary_domain: Some("eger.hu".into()),
            ..new_site("eger")
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            site.id,
            UpdateSite {
                name: Some("Eger".into()),
                primary_domain: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Eger");
    assert!(updated.primary_domain.is_none());
}

#[tokio::test]
async fn list_sites_is_paginated() {
    let db = setup().await;
    let repo = SurrealSiteRepository::new(db);

    for slug in ["c", "a", "b"] {
        repo.create(new_site(slug)).await.unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 1,
            limit: 1,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].slug, "b");
}

#[tokio::test]
async fn get_missing_site_is_not_found() {
    let db = setup().await;
    let repo = SurrealSiteRepository::new(db);

    let err = repo.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Site subscriptions
// -----------------------------------------------------------------------

#[tokio::test]
async fn upsert_replaces_the_single_subscription() {
    let db = setup().await;
    let sites = SurrealSiteRepository::new(db.clone());
    let repo_db = db.clone();
    let repo = SurrealSiteSubscriptionRepository::new(db);
    let site = sites.create(new_site("szeged")).await.unwrap();

    assert!(repo.find_by_site(site.id).await.unwrap().is_none());

    repo.upsert(
        site.id,
        UpsertSiteSubscription {
            plan: Plan::Basic,
            status: None,
            valid_until: None,
            plan_overrides: None,
        },
    )
    .await
    .unwrap();

    let overrides = PlanOverrides {
        limits: LimitOverrides {
            places_max: Some(40),
            ..Default::default()
        },
        ..Default::default()
    };
    let sub = repo
        .upsert(
            site.id,
            UpsertSiteSubscription {
                plan: Plan::Pro,
                status: Some(SubscriptionStatus::Canceled),
                valid_until: Some(Utc::now() + Duration::days(10)),
                plan_overrides: Some(overrides.clone()),
            },
        )
        .await
        .unwrap();

    assert_eq!(sub.site_id, site.id);
    assert_eq!(sub.plan, Plan::Pro);
    assert_eq!(sub.status, SubscriptionStatus::Canceled);
    assert_eq!(sub.plan_overrides, Some(overrides));

    // One row per site, however often it is upserted.
    let mut result = repo_db
        .query("SELECT * FROM site_subscription")
        .await
        .unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn empty_overrides_read_back_as_none() {
    let db = setup().await;
    let sites = SurrealSiteRepository::new(db.clone());
    let repo = SurrealSiteSubscriptionRepository::new(db);
    let site = sites.create(new_site("pecs")).await.unwrap();

    let sub = repo
        .upsert(
            site.id,
            UpsertSiteSubscription {
                plan: Plan::Free,
                status: Some(SubscriptionStatus::Active),
                valid_until: None,
                plan_overrides: Some(PlanOverrides::default()),
            },
        )
        .await
        .unwrap();
    assert!(sub.plan_overrides.is_none());
}

// -----------------------------------------------------------------------
// Feature subscriptions
// -----------------------------------------------------------------------

fn floorplan_subscription(site_id: uuid::Uuid) -> CreateFeatureSubscription {
    CreateFeatureSubscription {
        site_id,
        scope: SubscriptionScope::Site,
        place_id: None,
        feature_key: FeatureKey::Floorplans,
        plan_key: FeaturePlanKey::FpStandard,
        billing_period: BillingPeriod::Monthly,
        floorplan_limit: None,
        current_period_start: None,
        current_period_end: None,
    }
}

#[tokio::test]
async fn create_feature_subscription_defaults_period() {
    let db = setup().await;
    let repo = SurrealFeatureSubscriptionRepository::new(db);
    let site_id = uuid::Uuid::new_v4();

    let start = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
    let sub = repo
        .create(CreateFeatureSubscription {
            current_period_start: Some(start),
            ..floorplan_subscription(site_id)
        })
        .await
        .unwrap();

    assert_eq!(sub.status, FeatureSubscriptionStatus::Active);
    assert_eq!(sub.current_period_start, start);
    assert_eq!(sub.current_period_end, BillingPeriod::Monthly.period_end(start));
    assert!(sub.canceled_at.is_none());
}

#[tokio::test]
async fn feature_subscription_is_scoped_to_its_site() {
    let db = setup().await;
    let repo = SurrealFeatureSubscriptionRepository::new(db);
    let site_id = uuid::Uuid::new_v4();

    let sub = repo.create(floorplan_subscription(site_id)).await.unwrap();

    let err = repo.get_by_id(uuid::Uuid::new_v4(), sub.id).await.unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
    let err = repo.delete(uuid::Uuid::new_v4(), sub.id).await.unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
}

#[tokio::test]
async fn update_sets_status_and_canceled_at() {
    let db = setup().await;
    let repo = SurrealFeatureSubscriptionRepository::new(db);
    let site_id = uuid::Uuid::new_v4();
    let sub = repo.create(floorplan_subscription(site_id)).await.unwrap();

    let now = Utc::now();
    let canceled = repo
        .update(
            site_id,
            sub.id,
            UpdateFeatureSubscription {
                status: Some(FeatureSubscriptionStatus::Canceled),
                canceled_at: Some(Some(now)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(canceled.status, FeatureSubscriptionStatus::Canceled);
    assert!(canceled.canceled_at.is_some());

    let resumed = repo
        .update(
            site_id,
            sub.id,
            UpdateFeatureSubscription {
                status: Some(FeatureSubscriptionStatus::Active),
                canceled_at: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(resumed.canceled_at.is_none());
}

#[tokio::test]
async fn list_for_feature_is_newest_first() {
    let db = setup().await;
    let repo = SurrealFeatureSubscriptionRepository::new(db);
    let site_id = uuid::Uuid::new_v4();

    let first = repo.create(floorplan_subscription(site_id)).await.unwrap();
    let second = repo.create(floorplan_subscription(site_id)).await.unwrap();
    repo.create(floorplan_subscription(uuid::Uuid::new_v4()))
        .await
        .unwrap();

    let subs = repo
        .list_for_feature(site_id, FeatureKey::Floorplans)
        .await
        .unwrap();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].id, second.id);
    assert_eq!(subs[1].id, first.id);
}
