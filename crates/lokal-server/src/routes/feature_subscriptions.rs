//! Floorplan add-on subscriptions and their lifecycle actions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use lokal_core::models::feature_subscription::{
    BillingPeriod, CreateFeatureSubscription, FeatureKey, FeaturePlanKey, FeatureSubscription,
    SubscriptionScope, UpdateFeatureSubscription,
};
use lokal_entitlements::FloorplanEntitlement;
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route(
            "/sites/{site_id}/feature-subscriptions",
            get(list::<C>).post(create::<C>),
        )
        .route(
            "/sites/{site_id}/feature-subscriptions/{id}",
            get(get_one::<C>).patch(update::<C>).delete(delete::<C>),
        )
        .route(
            "/sites/{site_id}/feature-subscriptions/{id}/cancel",
            post(cancel::<C>),
        )
        .route(
            "/sites/{site_id}/feature-subscriptions/{id}/suspend",
            post(suspend::<C>),
        )
        .route(
            "/sites/{site_id}/feature-subscriptions/{id}/resume",
            post(resume::<C>),
        )
        .route(
            "/sites/{site_id}/places/{id}/floorplan-entitlement",
            get(floorplan_entitlement::<C>),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub scope: SubscriptionScope,
    pub place_id: Option<Uuid>,
    #[serde(default = "default_feature")]
    pub feature_key: FeatureKey,
    pub plan_key: FeaturePlanKey,
    pub billing_period: BillingPeriod,
    pub floorplan_limit: Option<u32>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}

fn default_feature() -> FeatureKey {
    FeatureKey::Floorplans
}

async fn list<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<FeatureSubscription>>> {
    Ok(Json(state.feature_subscriptions().list_by_site(site_id).await?))
}

async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateBody>,
) -> ApiResult<(StatusCode, Json<FeatureSubscription>)> {
    let subscription = state
        .feature_subscriptions()
        .create(CreateFeatureSubscription {
            site_id,
            scope: body.scope,
            place_id: body.place_id,
            feature_key: body.feature_key,
            plan_key: body.plan_key,
            billing_period: body.billing_period,
            floorplan_limit: body.floorplan_limit,
            current_period_start: body.current_period_start,
            current_period_end: body.current_period_end,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn get_one<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<FeatureSubscription>> {
    Ok(Json(state.feature_subscriptions().get(site_id, id).await?))
}

/// `status` and `canceled_at` are not writable here; lifecycle changes
/// go through the action endpoints.
async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdateFeatureSubscription>,
) -> ApiResult<Json<FeatureSubscription>> {
    Ok(Json(
        state.feature_subscriptions().update(site_id, id, input).await?,
    ))
}

async fn delete<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.feature_subscriptions().delete(site_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<FeatureSubscription>> {
    Ok(Json(state.feature_subscriptions().cancel(site_id, id).await?))
}

async fn suspend<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<FeatureSubscription>> {
    Ok(Json(state.feature_subscriptions().suspend(site_id, id).await?))
}

async fn resume<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<FeatureSubscription>> {
    Ok(Json(state.feature_subscriptions().resume(site_id, id).await?))
}

async fn floorplan_entitlement<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, place_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<FloorplanEntitlement>> {
    let entitlement = state
        .feature_subscriptions()
        .get_floorplan_entitlement(site_id, place_id)
        .await?;
    Ok(Json(entitlement))
}
