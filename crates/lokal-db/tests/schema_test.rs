//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    lokal_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "site",
        "site_subscription",
        "feature_subscription",
        "site_key",
        "slug",
        "place",
        "place_floorplan",
        "floorplan_pin",
        "event",
        "site_member",
        "site_domain",
        "gallery_image",
        "legal_page",
        "legal_page_translation",
        "collection_item",
        "price_band",
        "_migration",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    lokal_db::run_migrations(&db).await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_site_keys() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();

    db.query("CREATE site_key SET site_id = 'a', lang = 'hu', slug = 'tihany'")
        .await
        .unwrap()
        .check()
        .unwrap();

    // Same (lang, slug) on another site is still a duplicate.
    let result = db
        .query("CREATE site_key SET site_id = 'b', lang = 'hu', slug = 'tihany'")
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "duplicate site key should be rejected");

    // Same slug in another language is fine.
    db.query("CREATE site_key SET site_id = 'b', lang = 'en', slug = 'tihany'")
        .await
        .unwrap()
        .check()
        .unwrap();
}

#[tokio::test]
async fn pin_coordinates_outside_unit_square_are_rejected() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE floorplan_pin SET site_id = 's', floorplan_id = 'f', \
             x = 1.5, y = 0.5, label = 'Bar'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}

#[tokio::test]
async fn unknown_plan_is_rejected() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();

    let result = db
        .query("CREATE site_subscription SET site_id = 's', plan = 'GOLD', status = 'ACTIVE'")
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}

#[tokio::test]
async fn ping_answers_on_fresh_database() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    assert!(lokal_db::ping(&db).await);
}
