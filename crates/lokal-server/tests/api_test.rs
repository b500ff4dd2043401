//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory SurrealDB.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use lokal_entitlements::EntitlementsConfig;
use lokal_server::{AppState, build_router};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tower::ServiceExt;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lokal_db::run_migrations(&db).await.unwrap();
    db
}

async fn app() -> Router {
    let config = EntitlementsConfig {
        default_site_slug: Some("szentendre".into()),
        ..Default::default()
    };
    build_router(AppState::new(setup().await, config))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_site(app: &Router, slug: &str, name: &str) -> String {
    let (status, site) = send(
        app,
        "POST",
        "/api/admin/sites",
        Some(json!({ "slug": slug, "name": name, "primary_domain": null })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    site["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn public_entitlements_use_default_site_and_plan() {
    let app = app().await;
    create_site(&app, "szentendre", "Szentendre").await;

    let (status, body) = send(&app, "GET", "/api/hu/entitlements", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "BASIC");
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["has_subscription"], false);
}

#[tokio::test]
async fn unsupported_language_is_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/fr/entitlements", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");
}

#[tokio::test]
async fn unknown_site_key_is_not_found() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/hu/entitlements?siteKey=nincs", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn subscription_overrides_are_validated_and_applied() {
    let app = app().await;
    let site_id = create_site(&app, "eger", "Eger").await;
    let uri = format!("/api/admin/sites/{site_id}/subscription");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "plan": "FREE", "plan_overrides": { "limits": { "bogus": 1 } } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid plan overrides")
    );

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "plan": "FREE", "plan_overrides": { "limits": { "places_max": 2 } } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/admin/sites/{site_id}/entitlements"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "FREE");
    assert_eq!(body["limits"]["places_max"], 2);
}

#[tokio::test]
async fn free_plan_locks_featured_gate() {
    let app = app().await;
    let site_id = create_site(&app, "szentendre", "Szentendre").await;
    send(
        &app,
        "PUT",
        &format!("/api/admin/sites/{site_id}/subscription"),
        Some(json!({ "plan": "FREE" })),
    )
    .await;

    let (status, place) = send(
        &app,
        "POST",
        &format!("/api/admin/sites/{site_id}/places"),
        Some(json!({ "name": "Marcipán Múzeum" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let place_id = place["id"].as_str().unwrap();

    let (status, gates) = send(
        &app,
        "GET",
        &format!("/api/hu/places/{place_id}/gates"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        gates["featured"],
        json!({ "state": "locked", "reason": "not_in_plan", "upgrade_cta": "view_plans" })
    );
}

#[tokio::test]
async fn feature_subscription_lifecycle_over_http() {
    let app = app().await;
    let site_id = create_site(&app, "pecs", "Pécs").await;
    let base = format!("/api/admin/sites/{site_id}/feature-subscriptions");

    let (status, body) = send(
        &app,
        "POST",
        &base,
        Some(json!({ "scope": "site", "plan_key": "FP_CUSTOM", "billing_period": "MONTHLY" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");

    let (status, sub) = send(
        &app,
        "POST",
        &base,
        Some(json!({ "scope": "site", "plan_key": "FP_STANDARD", "billing_period": "MONTHLY" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["status"], "ACTIVE");
    let id = sub["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &base,
        Some(json!({ "scope": "site", "plan_key": "FP_STANDARD", "billing_period": "MONTHLY" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, canceled) = send(&app, "POST", &format!("{base}/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canceled["status"], "CANCELED");

    let (status, _) = send(&app, "POST", &format!("{base}/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, resumed) = send(&app, "POST", &format!("{base}/{id}/resume"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["status"], "ACTIVE");
    assert!(resumed["canceled_at"].is_null());

    let (status, _) = send(&app, "DELETE", &format!("{base}/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("{base}/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn slug_resolution_and_legal_pages_over_http() {
    let app = app().await;
    let site_id = create_site(&app, "szentendre", "Szentendre").await;
    let admin = format!("/api/admin/sites/{site_id}");

    let (status, _) = send(
        &app,
        "POST",
        &format!("{admin}/site-keys"),
        Some(json!({ "lang": "hu", "slug": "szentendre", "is_primary": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        &format!("{admin}/slugs"),
        Some(json!({
            "lang": "hu",
            "slug": "kavezo-osz",
            "entity_type": "place",
            "entity_id": "6f1c2f9e-3a35-4a4e-9d1b-4f7f5cbb0a11",
            "is_primary": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, resolved) = send(
        &app,
        "GET",
        "/api/public/hu/szentendre/resolve/K%C3%A1v%C3%A9z%C3%B3-%C5%90sz",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["canonical_slug"], "kavezo-osz");
    assert_eq!(resolved["should_redirect_to_normalized"], true);
    assert_eq!(resolved["needs_redirect"], true);

    let (status, body) = send(&app, "GET", "/api/public/en/szentendre/legal/terms", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("{admin}/legal-pages/terms/translations/hu"),
        Some(json!({
            "title": "ÁSZF",
            "content": "<p>Általános feltételek. Második mondat! Harmadik.</p>",
            "seo_title": null,
            "seo_description": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, page) = send(&app, "GET", "/api/public/en/szentendre/legal/terms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["content_lang"], "hu");
    assert_eq!(page["seo_title"], "ÁSZF");
    assert_eq!(
        page["seo_description"],
        "Általános feltételek. Második mondat!"
    );
}

#[tokio::test]
async fn malformed_body_uses_error_shape() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/api/admin/sites", Some(json!({ "name": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");

    let (status, body) = send(&app, "GET", "/api/admin/sites/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");
}

#[tokio::test]
async fn duplicate_site_slug_conflicts() {
    let app = app().await;
    create_site(&app, "gyor", "Győr").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/sites",
        Some(json!({ "slug": "gyor", "name": "Győr 2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "already_exists");
}

#[tokio::test]
async fn feature_subscription_for_unknown_site_is_not_found() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/sites/6f1c2f9e-3a35-4a4e-9d1b-4f7f5cbb0a11/feature-subscriptions",
        Some(json!({ "scope": "site", "plan_key": "FP_STANDARD", "billing_period": "MONTHLY" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}
