//! Site administration: sites, their subscription and entitlements,
//! site keys and entity slugs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use lokal_core::lang::Lang;
use lokal_core::models::site::{CreateSite, Site, UpdateSite};
use lokal_core::models::site_key::{CreateSiteKey, SiteKey, UpdateSiteKey};
use lokal_core::models::site_subscription::{
    SiteSubscription, SubscriptionStatus, UpsertSiteSubscription,
};
use lokal_core::models::slug::{CreateSlug, Slug, SlugEntityType, UpdateSlug};
use lokal_core::plan::{Plan, PlanOverrides};
use lokal_core::repository::PaginatedResult;
use lokal_entitlements::Entitlements;
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, PageQuery};
use crate::state::AppState;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/sites", get(list_sites::<C>).post(create_site::<C>))
        .route(
            "/sites/{site_id}",
            get(get_site::<C>)
                .patch(update_site::<C>)
                .delete(delete_site::<C>),
        )
        .route(
            "/sites/{site_id}/subscription",
            get(get_subscription::<C>).put(put_subscription::<C>),
        )
        .route("/sites/{site_id}/entitlements", get(get_entitlements::<C>))
        .route(
            "/sites/{site_id}/site-keys",
            get(list_site_keys::<C>).post(create_site_key::<C>),
        )
        .route(
            "/sites/{site_id}/site-keys/{id}",
            patch(update_site_key::<C>).delete(delete_site_key::<C>),
        )
        .route(
            "/sites/{site_id}/slugs",
            get(list_slugs::<C>).post(create_slug::<C>),
        )
        .route(
            "/sites/{site_id}/slugs/{id}",
            patch(update_slug::<C>).delete(delete_slug::<C>),
        )
}

// -- Sites -------------------------------------------------------------------

async fn list_sites<C: Connection>(
    State(state): State<AppState<C>>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<Site>>> {
    Ok(Json(state.sites().list_sites(page.pagination()).await?))
}

async fn create_site<C: Connection>(
    State(state): State<AppState<C>>,
    ApiJson(input): ApiJson<CreateSite>,
) -> ApiResult<(StatusCode, Json<Site>)> {
    let site = state.sites().create_site(input).await?;
    Ok((StatusCode::CREATED, Json(site)))
}

async fn get_site<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<Json<Site>> {
    Ok(Json(state.sites().get_site(site_id).await?))
}

async fn update_site<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateSite>,
) -> ApiResult<Json<Site>> {
    Ok(Json(state.sites().update_site(site_id, input).await?))
}

async fn delete_site<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.sites().delete_site(site_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Subscription and entitlements ------------------------------------------

/// Body of `PUT /subscription`. Overrides arrive as raw JSON so that
/// unknown keys and wrongly typed values are reported as a 400 with the
/// offending field.
#[derive(Debug, Deserialize)]
pub struct SubscriptionBody {
    pub plan: Plan,
    pub status: Option<SubscriptionStatus>,
    pub valid_until: Option<DateTime<Utc>>,
    pub plan_overrides: Option<serde_json::Value>,
}

async fn get_subscription<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<Json<Option<SiteSubscription>>> {
    Ok(Json(state.entitlements().get_subscription(site_id).await?))
}

async fn put_subscription<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SubscriptionBody>,
) -> ApiResult<Json<SiteSubscription>> {
    let plan_overrides = body
        .plan_overrides
        .filter(|v| !v.is_null())
        .map(PlanOverrides::from_json)
        .transpose()?;
    let input = UpsertSiteSubscription {
        plan: body.plan,
        status: body.status,
        valid_until: body.valid_until,
        plan_overrides,
    };
    Ok(Json(
        state.entitlements().set_subscription(site_id, input).await?,
    ))
}

async fn get_entitlements<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<Json<Entitlements>> {
    state.sites().get_site(site_id).await?;
    Ok(Json(state.entitlements().get_by_site_id(site_id).await?))
}

// -- Site keys ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SiteKeyBody {
    pub lang: Lang,
    pub slug: String,
    #[serde(default)]
    pub is_primary: bool,
    pub redirect_to_id: Option<Uuid>,
}

async fn list_site_keys<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<SiteKey>>> {
    Ok(Json(state.sites().list_site_keys(site_id).await?))
}

async fn create_site_key<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SiteKeyBody>,
) -> ApiResult<(StatusCode, Json<SiteKey>)> {
    let key = state
        .sites()
        .create_site_key(CreateSiteKey {
            site_id,
            lang: body.lang,
            slug: body.slug,
            is_primary: body.is_primary,
            redirect_to_id: body.redirect_to_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(key)))
}

async fn update_site_key<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdateSiteKey>,
) -> ApiResult<Json<SiteKey>> {
    Ok(Json(state.sites().update_site_key(site_id, id, input).await?))
}

async fn delete_site_key<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.sites().delete_site_key(site_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Slugs -------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SlugBody {
    pub lang: Lang,
    pub slug: String,
    pub entity_type: SlugEntityType,
    pub entity_id: Uuid,
    #[serde(default)]
    pub is_primary: bool,
    pub redirect_to_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct EntityQuery {
    pub entity_type: SlugEntityType,
    pub entity_id: Uuid,
}

async fn list_slugs<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> ApiResult<Json<Vec<Slug>>> {
    let slugs = state
        .sites()
        .list_slugs_for_entity(site_id, query.entity_type, query.entity_id)
        .await?;
    Ok(Json(slugs))
}

async fn create_slug<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SlugBody>,
) -> ApiResult<(StatusCode, Json<Slug>)> {
    let slug = state
        .sites()
        .create_slug(CreateSlug {
            site_id,
            lang: body.lang,
            slug: body.slug,
            entity_type: body.entity_type,
            entity_id: body.entity_id,
            is_primary: body.is_primary,
            redirect_to_id: body.redirect_to_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(slug)))
}

async fn update_slug<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdateSlug>,
) -> ApiResult<Json<Slug>> {
    Ok(Json(state.sites().update_slug(site_id, id, input).await?))
}

async fn delete_slug<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.sites().delete_slug(site_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
