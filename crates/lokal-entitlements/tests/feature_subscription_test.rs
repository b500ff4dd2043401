//! Integration tests for floorplan subscriptions and the floorplan
//! service using in-memory SurrealDB.

use chrono::{Duration, Utc};
use lokal_core::error::LokalError;
use lokal_core::models::feature_subscription::{
    BillingPeriod, CreateFeatureSubscription, FeatureKey, FeaturePlanKey,
    FeatureSubscriptionStatus, SubscriptionScope, UpdateFeatureSubscription,
};
use lokal_core::models::floorplan::{CreateFloorplan, CreatePin, UpdatePin};
use lokal_core::models::place::CreatePlace;
use lokal_core::models::site::CreateSite;
use lokal_core::models::site_subscription::UpsertSiteSubscription;
use lokal_core::plan::Plan;
use lokal_core::repository::{PlaceRepository, SiteRepository};
use lokal_db::repository::{
    SurrealFeatureSubscriptionRepository, SurrealFloorplanRepository, SurrealPlaceRepository,
    SurrealSiteRepository, SurrealSiteSubscriptionRepository, SurrealUsageRepository,
};
use lokal_entitlements::{
    EntitlementsConfig, EntitlementsService, FeatureSubscriptionService, FloorplanService,
    FloorplanStatus,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Subscriptions = FeatureSubscriptionService<
    SurrealSiteRepository<Db>,
    SurrealFeatureSubscriptionRepository<Db>,
    SurrealPlaceRepository<Db>,
    SurrealFloorplanRepository<Db>,
>;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();
    db
}

type Entitlements = EntitlementsService<
    SurrealSiteRepository<Db>,
    SurrealSiteSubscriptionRepository<Db>,
    SurrealUsageRepository<Db>,
>;

type Floorplans = FloorplanService<
    SurrealSiteRepository<Db>,
    SurrealSiteSubscriptionRepository<Db>,
    SurrealUsageRepository<Db>,
    SurrealFeatureSubscriptionRepository<Db>,
    SurrealPlaceRepository<Db>,
    SurrealFloorplanRepository<Db>,
>;

fn subscriptions(db: &Surreal<Db>) -> Subscriptions {
    FeatureSubscriptionService::new(
        SurrealSiteRepository::new(db.clone()),
        SurrealFeatureSubscriptionRepository::new(db.clone()),
        SurrealPlaceRepository::new(db.clone()),
        SurrealFloorplanRepository::new(db.clone()),
    )
}

fn entitlements(db: &Surreal<Db>) -> Entitlements {
    EntitlementsService::new(
        SurrealSiteRepository::new(db.clone()),
        SurrealSiteSubscriptionRepository::new(db.clone()),
        SurrealUsageRepository::new(db.clone()),
        EntitlementsConfig::default(),
    )
}

fn floorplans(db: &Surreal<Db>) -> Floorplans {
    FloorplanService::new(
        entitlements(db),
        subscriptions(db),
        SurrealPlaceRepository::new(db.clone()),
        SurrealFloorplanRepository::new(db.clone()),
    )
}

async fn create_site(db: &Surreal<Db>, slug: &str) -> Uuid {
    SurrealSiteRepository::new(db.clone())
        .create(CreateSite {
            slug: slug.into(),
            name: slug.into(),
            primary_domain: None,
            is_active: None,
        })
        .await
        .unwrap()
        .id
}

async fn create_place(db: &Surreal<Db>, site_id: Uuid, name: &str) -> Uuid {
    SurrealPlaceRepository::new(db.clone())
        .create(CreatePlace {
            site_id,
            name: name.into(),
            is_featured: false,
            gallery_image_limit: None,
        })
        .await
        .unwrap()
        .id
}

fn site_scope(site_id: Uuid) -> CreateFeatureSubscription {
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

fn place_scope(site_id: Uuid, place_id: Uuid) -> CreateFeatureSubscription {
    CreateFeatureSubscription {
        scope: SubscriptionScope::Place,
        place_id: Some(place_id),
        ..site_scope(site_id)
    }
}

fn floorplan(site_id: Uuid, place_id: Uuid) -> CreateFloorplan {
    CreateFloorplan {
        site_id,
        place_id,
        title: "Földszint".into(),
        image_url: "https://cdn.example/fsz.png".into(),
        sort_order: None,
    }
}

#[tokio::test]
async fn duplicate_active_subscription_is_rejected() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "eger").await;

    service.create(site_scope(site_id)).await.unwrap();
    let err = service.create(site_scope(site_id)).await.unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    // A different plan key is not a duplicate.
    service
        .create(CreateFeatureSubscription {
            plan_key: FeaturePlanKey::FpCustom,
            floorplan_limit: Some(4),
            ..site_scope(site_id)
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn canceled_subscription_does_not_block_a_new_one() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "pecs").await;

    let first = service.create(site_scope(site_id)).await.unwrap();
    service.cancel(site_id, first.id).await.unwrap();
    service.create(site_scope(site_id)).await.unwrap();

    assert_eq!(service.list_by_site(site_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn custom_plan_requires_a_limit() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "gyor").await;

    let err = service
        .create(CreateFeatureSubscription {
            plan_key: FeaturePlanKey::FpCustom,
            ..site_scope(site_id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));
    assert!(service.list_by_site(site_id).await.unwrap().is_empty());

    // Switching a standard subscription to custom needs a limit too.
    let sub = service.create(site_scope(site_id)).await.unwrap();
    let err = service
        .update(
            site_id,
            sub.id,
            UpdateFeatureSubscription {
                plan_key: Some(FeaturePlanKey::FpCustom),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    let updated = service
        .update(
            site_id,
            sub.id,
            UpdateFeatureSubscription {
                plan_key: Some(FeaturePlanKey::FpCustom),
                floorplan_limit: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.plan_key, FeaturePlanKey::FpCustom);
    assert_eq!(updated.floorplan_limit, Some(3));
}

#[tokio::test]
async fn scope_rules_are_enforced() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "vac").await;

    let err = service
        .create(CreateFeatureSubscription {
            scope: SubscriptionScope::Place,
            ..site_scope(site_id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    let err = service
        .create(CreateFeatureSubscription {
            place_id: Some(Uuid::new_v4()),
            ..site_scope(site_id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    // Place scope needs a place of this site.
    let err = service
        .create(place_scope(site_id, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
}

#[tokio::test]
async fn period_end_must_follow_start() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "tata").await;
    let start = Utc::now();

    let err = service
        .create(CreateFeatureSubscription {
            current_period_start: Some(start),
            current_period_end: Some(start - Duration::days(1)),
            ..site_scope(site_id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    let yearly = service
        .create(CreateFeatureSubscription {
            billing_period: BillingPeriod::Yearly,
            current_period_start: Some(start),
            ..site_scope(site_id)
        })
        .await
        .unwrap();
    assert!(yearly.current_period_end > start + Duration::days(364));
}

#[tokio::test]
async fn place_scope_takes_precedence_over_site_scope() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "sopron").await;
    let place_id = create_place(&db, site_id, "Várszínház").await;
    let other_place = create_place(&db, site_id, "Bazilika").await;

    let place_sub = service
        .create(place_scope(site_id, place_id))
        .await
        .unwrap();
    let site_sub = service.create(site_scope(site_id)).await.unwrap();

    let ent = service
        .get_floorplan_entitlement(site_id, place_id)
        .await
        .unwrap();
    assert!(ent.entitled);
    assert_eq!(ent.status, FloorplanStatus::Active);
    assert_eq!(ent.subscription_id, Some(place_sub.id));
    assert_eq!(ent.limit, 1);

    let ent = service
        .get_floorplan_entitlement(site_id, other_place)
        .await
        .unwrap();
    assert_eq!(ent.subscription_id, Some(site_sub.id));
}

#[tokio::test]
async fn lifecycle_transitions() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "kalocsa").await;
    let place_id = create_place(&db, site_id, "Kálvária").await;
    let sub = service
        .create(place_scope(site_id, place_id))
        .await
        .unwrap();

    let canceled = service.cancel(site_id, sub.id).await.unwrap();
    assert_eq!(canceled.status, FeatureSubscriptionStatus::Canceled);
    assert!(canceled.canceled_at.is_some());
    // Soft cancel: still usable until the period ends.
    let ent = service
        .get_floorplan_entitlement(site_id, place_id)
        .await
        .unwrap();
    assert_eq!(ent.status, FloorplanStatus::Active);

    let err = service.cancel(site_id, sub.id).await.unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    let suspended = service.suspend(site_id, sub.id).await.unwrap();
    assert_eq!(suspended.status, FeatureSubscriptionStatus::Suspended);
    let ent = service
        .get_floorplan_entitlement(site_id, place_id)
        .await
        .unwrap();
    assert_eq!(ent.status, FloorplanStatus::Locked);
    assert!(!ent.entitled);

    let err = service.suspend(site_id, sub.id).await.unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    let resumed = service.resume(site_id, sub.id).await.unwrap();
    assert_eq!(resumed.status, FeatureSubscriptionStatus::Active);
    assert!(resumed.canceled_at.is_none());

    let err = service.resume(site_id, sub.id).await.unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));
}

#[tokio::test]
async fn lapsed_subscription_cannot_resume() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "zirc").await;
    let start = Utc::now() - Duration::days(40);

    let sub = service
        .create(CreateFeatureSubscription {
            current_period_start: Some(start),
            current_period_end: Some(start + Duration::days(30)),
            ..site_scope(site_id)
        })
        .await
        .unwrap();
    service.suspend(site_id, sub.id).await.unwrap();

    let err = service.resume(site_id, sub.id).await.unwrap_err();
    assert!(err.to_string().contains("period has ended"));
}

#[tokio::test]
async fn subscriptions_are_site_scoped() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "szeged").await;
    let sub = service.create(site_scope(site_id)).await.unwrap();

    let err = service.get(Uuid::new_v4(), sub.id).await.unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));

    service.delete(site_id, sub.id).await.unwrap();
    let err = service.get(site_id, sub.id).await.unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
}

#[tokio::test]
async fn floorplan_creation_is_gated_by_entitlement() {
    let db = setup().await;
    let site_id = create_site(&db, "esztergom").await;
    let place_id = create_place(&db, site_id, "Pince").await;
    let floorplans = floorplans(&db);

    let err = floorplans
        .create(floorplan(site_id, place_id))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: floorplan feature is locked"
    );

    subscriptions(&db)
        .create(place_scope(site_id, place_id))
        .await
        .unwrap();
    let created = floorplans
        .create(floorplan(site_id, place_id))
        .await
        .unwrap();
    assert_eq!(created.sort_order, 0);

    let err = floorplans
        .create(floorplan(site_id, place_id))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("floorplan limit reached"));

    let ent = subscriptions(&db)
        .get_floorplan_entitlement(site_id, place_id)
        .await
        .unwrap();
    assert_eq!(ent.status, FloorplanStatus::LimitReached);
    assert_eq!(ent.used, 1);
}

#[tokio::test]
async fn pins_validate_coordinates_and_floorplan() {
    let db = setup().await;
    let site_id = create_site(&db, "papa").await;
    let place_id = create_place(&db, site_id, "Galéria").await;
    subscriptions(&db)
        .create(site_scope(site_id))
        .await
        .unwrap();
    let floorplans = floorplans(&db);
    let plan = floorplans
        .create(floorplan(site_id, place_id))
        .await
        .unwrap();

    let pin = |x: f64, y: f64, floorplan_id: Uuid| CreatePin {
        site_id,
        floorplan_id,
        x,
        y,
        label: "Bejárat".into(),
        sort_order: None,
    };

    let err = floorplans.create_pin(pin(1.2, 0.5, plan.id)).await.unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    let err = floorplans
        .create_pin(pin(0.5, 0.5, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));

    let first = floorplans.create_pin(pin(0.0, 1.0, plan.id)).await.unwrap();
    let second = floorplans.create_pin(pin(0.5, 0.5, plan.id)).await.unwrap();
    assert_eq!(second.sort_order, first.sort_order + 1);

    let err = floorplans
        .update_pin(
            site_id,
            plan.id,
            first.id,
            UpdatePin {
                y: Some(-0.1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    floorplans.delete_pin(site_id, plan.id, first.id).await.unwrap();
    let pins = floorplans.list_pins(site_id, plan.id).await.unwrap();
    assert_eq!(pins.len(), 1);
    assert_eq!(pins[0].id, second.id);
}

#[tokio::test]
async fn unknown_site_cannot_subscribe() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = Uuid::new_v4();

    let err = service.create(site_scope(site_id)).await.unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
    assert!(service.list_by_site(site_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn resume_rejects_a_second_active_duplicate() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "veszprem").await;

    let first = service.create(site_scope(site_id)).await.unwrap();
    service.cancel(site_id, first.id).await.unwrap();
    let second = service.create(site_scope(site_id)).await.unwrap();

    let err = service.resume(site_id, first.id).await.unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));
    let active = service
        .list_by_site(site_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.status == FeatureSubscriptionStatus::Active)
        .collect::<Vec<_>>();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);

    // Once the other one is gone the canceled one can come back.
    service.delete(site_id, second.id).await.unwrap();
    let resumed = service.resume(site_id, first.id).await.unwrap();
    assert_eq!(resumed.status, FeatureSubscriptionStatus::Active);
}

#[tokio::test]
async fn plan_change_rejects_a_second_active_duplicate() {
    let db = setup().await;
    let service = subscriptions(&db);
    let site_id = create_site(&db, "godollo").await;

    service.create(site_scope(site_id)).await.unwrap();
    let custom = service
        .create(CreateFeatureSubscription {
            plan_key: FeaturePlanKey::FpCustom,
            floorplan_limit: Some(4),
            ..site_scope(site_id)
        })
        .await
        .unwrap();

    let err = service
        .update(
            site_id,
            custom.id,
            UpdateFeatureSubscription {
                plan_key: Some(FeaturePlanKey::FpStandard),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    // Keeping its own plan key is not a duplicate of itself.
    let same = service
        .update(
            site_id,
            custom.id,
            UpdateFeatureSubscription {
                plan_key: Some(FeaturePlanKey::FpCustom),
                floorplan_limit: Some(6),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.floorplan_limit, Some(6));
}

#[tokio::test]
async fn free_plan_blocks_floorplans_even_with_add_on() {
    let db = setup().await;
    let site_id = create_site(&db, "mako").await;
    entitlements(&db)
        .set_subscription(
            site_id,
            UpsertSiteSubscription {
                plan: Plan::Free,
                status: None,
                valid_until: None,
                plan_overrides: None,
            },
        )
        .await
        .unwrap();
    let place_id = create_place(&db, site_id, "Hagymaház").await;
    subscriptions(&db)
        .create(place_scope(site_id, place_id))
        .await
        .unwrap();

    let err = floorplans(&db)
        .create(floorplan(site_id, place_id))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: floorplan feature is locked"
    );
    assert!(
        floorplans(&db)
            .list_by_place(site_id, place_id)
            .await
            .unwrap()
            .is_empty()
    );
}
