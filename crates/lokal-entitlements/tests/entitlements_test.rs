//! Integration tests for plan entitlements, place limits and gates
//! using in-memory SurrealDB.

use chrono::{Duration, Utc};
use lokal_core::error::LokalError;
use lokal_core::models::place::{CreatePlace, UpdatePlace};
use lokal_core::models::site::CreateSite;
use lokal_core::models::site_subscription::{SubscriptionStatus, UpsertSiteSubscription};
use lokal_core::plan::{Feature, LimitOverrides, Plan, PlanOverrides};
use lokal_core::repository::SiteRepository;
use lokal_db::repository::{
    SurrealFeatureSubscriptionRepository, SurrealFloorplanRepository, SurrealPlaceRepository,
    SurrealSiteRepository, SurrealSiteSubscriptionRepository, SurrealUsageRepository,
};
use lokal_entitlements::gate::{GateReason, UpgradeCta};
use lokal_entitlements::{
    EntitlementsConfig, EntitlementsService, FeatureGate, FeatureSubscriptionService,
    PlaceService, PlaceUpsellService,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Entitlements = EntitlementsService<
    SurrealSiteRepository<Db>,
    SurrealSiteSubscriptionRepository<Db>,
    SurrealUsageRepository<Db>,
>;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();
    db
}

fn entitlements(db: &Surreal<Db>, config: EntitlementsConfig) -> Entitlements {
    EntitlementsService::new(
        SurrealSiteRepository::new(db.clone()),
        SurrealSiteSubscriptionRepository::new(db.clone()),
        SurrealUsageRepository::new(db.clone()),
        config,
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

fn subscription(plan: Plan) -> UpsertSiteSubscription {
    UpsertSiteSubscription {
        plan,
        status: None,
        valid_until: None,
        plan_overrides: None,
    }
}

fn place(site_id: Uuid, name: &str, is_featured: bool) -> CreatePlace {
    CreatePlace {
        site_id,
        name: name.into(),
        is_featured,
        gallery_image_limit: None,
    }
}

#[tokio::test]
async fn missing_subscription_uses_configured_default() {
    let db = setup().await;
    let site_id = create_site(&db, "eger").await;

    let service = entitlements(&db, EntitlementsConfig::default());
    let ent = service.get_by_site_id(site_id).await.unwrap();
    assert_eq!(ent.plan, Plan::Basic);
    assert_eq!(ent.status, SubscriptionStatus::Active);
    assert!(!ent.has_subscription);

    let service = entitlements(
        &db,
        EntitlementsConfig {
            default_plan: Plan::Free,
            default_status: SubscriptionStatus::Inactive,
            ..Default::default()
        },
    );
    let ent = service.get_by_site_id(site_id).await.unwrap();
    assert_eq!(ent.plan, Plan::Free);
    assert_eq!(ent.status, SubscriptionStatus::Inactive);
}

#[tokio::test]
async fn lapsed_valid_until_reads_as_expired() {
    let db = setup().await;
    let site_id = create_site(&db, "gyor").await;
    let service = entitlements(&db, EntitlementsConfig::default());

    service
        .set_subscription(
            site_id,
            UpsertSiteSubscription {
                valid_until: Some(Utc::now() - Duration::days(1)),
                ..subscription(Plan::Pro)
            },
        )
        .await
        .unwrap();

    let ent = service.get_by_site_id(site_id).await.unwrap();
    assert_eq!(ent.plan, Plan::Pro);
    assert_eq!(ent.status, SubscriptionStatus::Expired);
    assert!(!ent.is_feature_enabled(Feature::Galleries));
}

#[tokio::test]
async fn overrides_replace_plan_defaults_and_usage_is_live() {
    let db = setup().await;
    let site_id = create_site(&db, "sopron").await;
    let service = entitlements(&db, EntitlementsConfig::default());

    service
        .set_subscription(
            site_id,
            UpsertSiteSubscription {
                plan_overrides: Some(PlanOverrides {
                    limits: LimitOverrides {
                        places_max: Some(2),
                        ..Default::default()
                    },
                    ..Default::default()
                }),
                ..subscription(Plan::Basic)
            },
        )
        .await
        .unwrap();

    let places = PlaceService::new(
        entitlements(&db, EntitlementsConfig::default()),
        SurrealPlaceRepository::new(db.clone()),
    );
    places.create(place(site_id, "Tűztorony", false)).await.unwrap();

    let ent = service.get_by_site_id(site_id).await.unwrap();
    assert_eq!(ent.limits.places_max, 2);
    assert_eq!(ent.limits.featured_places_max, 1);
    assert_eq!(ent.usage.places, 1);

    places.create(place(site_id, "Kecske-templom", false)).await.unwrap();
    let err = places
        .create(place(site_id, "Harmadik", false))
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));
}

#[tokio::test]
async fn set_subscription_requires_existing_site() {
    let db = setup().await;
    let service = entitlements(&db, EntitlementsConfig::default());

    let err = service
        .set_subscription(Uuid::new_v4(), subscription(Plan::Pro))
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
}

#[tokio::test]
async fn inactive_subscription_blocks_new_places() {
    let db = setup().await;
    let site_id = create_site(&db, "vac").await;
    let service = entitlements(&db, EntitlementsConfig::default());
    service
        .set_subscription(
            site_id,
            UpsertSiteSubscription {
                status: Some(SubscriptionStatus::Inactive),
                ..subscription(Plan::Business)
            },
        )
        .await
        .unwrap();

    let places = PlaceService::new(service, SurrealPlaceRepository::new(db.clone()));
    let err = places
        .create(place(site_id, "Főtér", false))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("INACTIVE"));
}

#[tokio::test]
async fn free_plan_cannot_feature_places() {
    let db = setup().await;
    let site_id = create_site(&db, "tata").await;
    let service = entitlements(&db, EntitlementsConfig::default());
    service
        .set_subscription(site_id, subscription(Plan::Free))
        .await
        .unwrap();

    let places = PlaceService::new(
        entitlements(&db, EntitlementsConfig::default()),
        SurrealPlaceRepository::new(db.clone()),
    );
    let err = places
        .create(place(site_id, "Öreg-tó", true))
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    let created = places.create(place(site_id, "Öreg-tó", false)).await.unwrap();
    let err = places
        .update(
            site_id,
            created.id,
            UpdatePlace {
                is_featured: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::Validation { .. }));

    // Renaming is not a featured write and passes.
    places
        .update(
            site_id,
            created.id,
            UpdatePlace {
                name: Some("Öreg-tó partja".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn place_gates_reflect_plan_and_usage() {
    let db = setup().await;
    let site_id = create_site(&db, "zirc").await;
    let service = entitlements(&db, EntitlementsConfig::default());
    service
        .set_subscription(site_id, subscription(Plan::Free))
        .await
        .unwrap();

    let place_repo = SurrealPlaceRepository::new(db.clone());
    let places = PlaceService::new(
        entitlements(&db, EntitlementsConfig::default()),
        place_repo.clone(),
    );
    let apatsag = places.create(place(site_id, "Apátság", false)).await.unwrap();

    let upsell = PlaceUpsellService::new(
        service,
        FeatureSubscriptionService::new(
            SurrealSiteRepository::new(db.clone()),
            SurrealFeatureSubscriptionRepository::new(db.clone()),
            place_repo.clone(),
            SurrealFloorplanRepository::new(db.clone()),
        ),
        place_repo,
        SurrealUsageRepository::new(db.clone()),
    );

    let gates = upsell.place_gates(site_id, apatsag.id).await.unwrap();
    assert_eq!(
        gates.featured,
        FeatureGate::Locked {
            reason: GateReason::NotInPlan,
            upgrade_cta: UpgradeCta::ViewPlans,
        }
    );
    assert!(!gates.gallery.is_enabled());
    assert!(!gates.floorplan.is_enabled());

    let err = upsell
        .place_gates(site_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
}
