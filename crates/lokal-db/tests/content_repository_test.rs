//! Integration tests for LegalPage, Collection and PriceBand
//! repositories using in-memory SurrealDB.

use lokal_core::error::LokalError;
use lokal_core::lang::Lang;
use lokal_core::models::collection::{
    CollectionTranslation, CreateCollection, CreateCollectionItem, UpdateCollection,
    UpdateCollectionItem,
};
use lokal_core::models::legal_page::{LegalPageKey, UpsertLegalTranslation};
use lokal_core::models::price_band::{CreatePriceBand, UpdatePriceBand};
use lokal_core::repository::{
    CollectionRepository, LegalPageRepository, Pagination, PriceBandRepository,
};
use lokal_db::repository::{
    SurrealCollectionRepository, SurrealLegalPageRepository, SurrealPriceBandRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();
    db
}

fn translation(title: &str) -> UpsertLegalTranslation {
    UpsertLegalTranslation {
        title: title.into(),
        content: format!("<p>{title}</p>"),
        seo_title: None,
        seo_description: None,
    }
}

// -----------------------------------------------------------------------
// Legal pages
// -----------------------------------------------------------------------

#[tokio::test]
async fn upsert_page_creates_then_toggles() {
    let db = setup().await;
    let repo = SurrealLegalPageRepository::new(db);
    let site_id = Uuid::new_v4();

    let page = repo
        .upsert_page(site_id, LegalPageKey::Imprint, true)
        .await
        .unwrap();
    assert!(page.is_active);

    let page2 = repo
        .upsert_page(site_id, LegalPageKey::Imprint, false)
        .await
        .unwrap();
    assert_eq!(page2.id, page.id);
    assert!(!page2.is_active);

    assert_eq!(repo.list_pages(site_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn upsert_translation_keeps_one_row_per_language() {
    let db = setup().await;
    let repo = SurrealLegalPageRepository::new(db);
    let site_id = Uuid::new_v4();

    let first = repo
        .upsert_translation(site_id, LegalPageKey::Terms, Lang::Hu, translation("ÁSZF"))
        .await
        .unwrap();
    let second = repo
        .upsert_translation(site_id, LegalPageKey::Terms, Lang::Hu, translation("ÁSZF 2"))
        .await
        .unwrap();
    repo.upsert_translation(site_id, LegalPageKey::Terms, Lang::En, translation("Terms"))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.title, "ÁSZF 2");

    let all = repo
        .list_translations(site_id, LegalPageKey::Terms)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn delete_page_removes_translations() {
    let db = setup().await;
    let repo = SurrealLegalPageRepository::new(db);
    let site_id = Uuid::new_v4();

    repo.upsert_page(site_id, LegalPageKey::Privacy, true)
        .await
        .unwrap();
    repo.upsert_translation(site_id, LegalPageKey::Privacy, Lang::De, translation("Datenschutz"))
        .await
        .unwrap();

    repo.delete_page(site_id, LegalPageKey::Privacy).await.unwrap();

    assert!(repo
        .find_page(site_id, LegalPageKey::Privacy)
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .find_translation(site_id, LegalPageKey::Privacy, Lang::De)
        .await
        .unwrap()
        .is_none());
}

// -----------------------------------------------------------------------
// Collections
// -----------------------------------------------------------------------

fn hu(title: &str) -> CollectionTranslation {
    CollectionTranslation {
        lang: Lang::Hu,
        title: title.into(),
        description: None,
    }
}

#[tokio::test]
async fn collection_with_items() {
    let db = setup().await;
    let repo = SurrealCollectionRepository::new(db);

    let collection = repo
        .create(CreateCollection {
            slug: "tavparti".into(),
            sort_order: None,
            translations: vec![hu("Tóparti városok")],
        })
        .await
        .unwrap();
    assert_eq!(collection.translations, vec![hu("Tóparti városok")]);

    let site_a = Uuid::new_v4();
    let site_b = Uuid::new_v4();
    let item_b = repo
        .add_item(
            collection.id,
            CreateCollectionItem {
                site_id: site_b,
                sort_order: Some(2),
                overrides: vec![],
            },
        )
        .await
        .unwrap();
    repo.add_item(
        collection.id,
        CreateCollectionItem {
            site_id: site_a,
            sort_order: Some(1),
            overrides: vec![hu("Keszthely")],
        },
    )
    .await
    .unwrap();

    // The same site twice in one collection is rejected.
    let err = repo
        .add_item(
            collection.id,
            CreateCollectionItem {
                site_id: site_a,
                sort_order: None,
                overrides: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::AlreadyExists { .. }));

    let items = repo.list_items(collection.id).await.unwrap();
    assert_eq!(items[0].site_id, site_a);
    assert_eq!(items[0].overrides[0].title, "Keszthely");

    let moved = repo
        .update_item(
            collection.id,
            item_b.id,
            UpdateCollectionItem {
                sort_order: Some(0),
                overrides: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.sort_order, 0);

    repo.delete(collection.id).await.unwrap();
    assert!(repo.list_items(collection.id).await.unwrap().is_empty());
    assert!(repo.find_by_slug("tavparti").await.unwrap().is_none());
}

#[tokio::test]
async fn update_collection_replaces_translations() {
    let db = setup().await;
    let repo = SurrealCollectionRepository::new(db);

    let collection = repo
        .create(CreateCollection {
            slug: "borvidekek".into(),
            sort_order: Some(3),
            translations: vec![hu("Borvidékek")],
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            collection.id,
            UpdateCollection {
                is_active: Some(false),
                translations: Some(vec![CollectionTranslation {
                    lang: Lang::En,
                    title: "Wine regions".into(),
                    description: Some("Tokaj and more".into()),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.translations.len(), 1);
    assert_eq!(updated.translations[0].lang, Lang::En);

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

// -----------------------------------------------------------------------
// Price bands
// -----------------------------------------------------------------------

#[tokio::test]
async fn price_bands_default_currency_and_order() {
    let db = setup().await;
    let repo = SurrealPriceBandRepository::new(db);
    let site_id = Uuid::new_v4();

    let premium = repo
        .create(CreatePriceBand {
            site_id,
            key: "premium".into(),
            label: "Prémium".into(),
            min_price: 10_000,
            max_price: None,
            currency: None,
            sort_order: Some(2),
        })
        .await
        .unwrap();
    repo.create(CreatePriceBand {
        site_id,
        key: "budget".into(),
        label: "Olcsó".into(),
        min_price: 0,
        max_price: Some(3_000),
        currency: Some("EUR".into()),
        sort_order: Some(1),
    })
    .await
    .unwrap();

    assert_eq!(premium.currency, "HUF");
    assert_eq!(premium.key, "premium");

    let bands = repo.list_by_site(site_id).await.unwrap();
    assert_eq!(bands[0].key, "budget");
    assert_eq!(bands[1].key, "premium");

    let capped = repo
        .update(
            site_id,
            premium.id,
            UpdatePriceBand {
                max_price: Some(Some(50_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(capped.max_price, Some(50_000));
}

#[tokio::test]
async fn duplicate_price_band_key_is_already_exists() {
    let db = setup().await;
    let repo = SurrealPriceBandRepository::new(db);
    let site_id = Uuid::new_v4();

    let band = CreatePriceBand {
        site_id,
        key: "mid".into(),
        label: "Közép".into(),
        min_price: 3_000,
        max_price: Some(8_000),
        currency: None,
        sort_order: None,
    };
    repo.create(band.clone()).await.unwrap();
    let err = repo.create(band).await.unwrap_err();
    assert!(matches!(err, LokalError::AlreadyExists { .. }));
}

#[tokio::test]
async fn rows_without_sort_order_append_at_the_end() {
    let db = setup().await;
    let collections = SurrealCollectionRepository::new(db.clone());
    let bands = SurrealPriceBandRepository::new(db);
    let site_id = Uuid::new_v4();

    let mut orders = Vec::new();
    for slug in ["dunakanyar", "balaton", "tokaj"] {
        let collection = collections
            .create(CreateCollection {
                slug: slug.into(),
                sort_order: None,
                translations: vec![hu(slug)],
            })
            .await
            .unwrap();
        orders.push(collection.sort_order);
    }
    assert_eq!(orders, vec![0, 1, 2]);

    let collection = collections.find_by_slug("balaton").await.unwrap().unwrap();
    let mut item_orders = Vec::new();
    for _ in 0..3 {
        let item = collections
            .add_item(
                collection.id,
                CreateCollectionItem {
                    site_id: Uuid::new_v4(),
                    sort_order: None,
                    overrides: vec![],
                },
            )
            .await
            .unwrap();
        item_orders.push(item.sort_order);
    }
    assert_eq!(item_orders, vec![0, 1, 2]);

    let mut band_orders = Vec::new();
    for (key, min_price) in [("olcso", 0), ("kozep", 3_000), ("premium", 8_000)] {
        let band = bands
            .create(CreatePriceBand {
                site_id,
                key: key.into(),
                label: key.into(),
                min_price,
                max_price: None,
                currency: None,
                sort_order: None,
            })
            .await
            .unwrap();
        band_orders.push(band.sort_order);
    }
    assert_eq!(band_orders, vec![0, 1, 2]);

    // Ordering is per site.
    let other = bands
        .create(CreatePriceBand {
            site_id: Uuid::new_v4(),
            key: "olcso".into(),
            label: "Olcsó".into(),
            min_price: 0,
            max_price: None,
            currency: None,
            sort_order: None,
        })
        .await
        .unwrap();
    assert_eq!(other.sort_order, 0);
}

#[tokio::test]
async fn removing_a_missing_item_is_not_found() {
    let db = setup().await;
    let repo = SurrealCollectionRepository::new(db);
    let collection = repo
        .create(CreateCollection {
            slug: "varak".into(),
            sort_order: None,
            translations: vec![hu("Várak")],
        })
        .await
        .unwrap();

    let err = repo
        .remove_item(collection.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, LokalError::NotFound { .. }));
}
