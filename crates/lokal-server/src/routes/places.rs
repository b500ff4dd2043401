//! Places, their feature gates, floorplans and floorplan pins.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use lokal_core::models::floorplan::{
    CreateFloorplan, CreatePin, FloorplanPin, PlaceFloorplan, UpdateFloorplan, UpdatePin,
};
use lokal_core::models::place::{CreatePlace, Place, UpdatePlace};
use lokal_core::repository::PaginatedResult;
use lokal_entitlements::PlaceGates;
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, PageQuery};
use crate::state::AppState;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route(
            "/sites/{site_id}/places",
            get(list_places::<C>).post(create_place::<C>),
        )
        .route(
            "/sites/{site_id}/places/{id}",
            get(get_place::<C>)
                .patch(update_place::<C>)
                .delete(delete_place::<C>),
        )
        .route("/sites/{site_id}/places/{id}/gates", get(place_gates::<C>))
        .route(
            "/sites/{site_id}/floorplans",
            get(list_floorplans::<C>).post(create_floorplan::<C>),
        )
        .route(
            "/sites/{site_id}/floorplans/{id}",
            get(get_floorplan::<C>)
                .patch(update_floorplan::<C>)
                .delete(delete_floorplan::<C>),
        )
        .route(
            "/sites/{site_id}/floorplans/{id}/pins",
            get(list_pins::<C>).post(create_pin::<C>),
        )
        .route(
            "/sites/{site_id}/floorplans/{id}/pins/{pin_id}",
            patch(update_pin::<C>).delete(delete_pin::<C>),
        )
}

// -- Places ------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceBody {
    pub name: String,
    #[serde(default)]
    pub is_featured: bool,
    pub gallery_image_limit: Option<u32>,
}

async fn list_places<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<Place>>> {
    Ok(Json(state.places().list(site_id, page.pagination()).await?))
}

async fn create_place<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<PlaceBody>,
) -> ApiResult<(StatusCode, Json<Place>)> {
    let place = state
        .places()
        .create(CreatePlace {
            site_id,
            name: body.name,
            is_featured: body.is_featured,
            gallery_image_limit: body.gallery_image_limit,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(place)))
}

async fn get_place<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Place>> {
    Ok(Json(state.places().get(site_id, id).await?))
}

async fn update_place<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdatePlace>,
) -> ApiResult<Json<Place>> {
    Ok(Json(state.places().update(site_id, id, input).await?))
}

async fn delete_place<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.places().delete(site_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn place_gates<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<PlaceGates>> {
    Ok(Json(state.upsell().place_gates(site_id, id).await?))
}

// -- Floorplans --------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FloorplanBody {
    pub place_id: Uuid,
    pub title: String,
    pub image_url: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceQuery {
    pub place_id: Uuid,
}

async fn list_floorplans<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PlaceQuery>,
) -> ApiResult<Json<Vec<PlaceFloorplan>>> {
    Ok(Json(
        state.floorplans().list_by_place(site_id, query.place_id).await?,
    ))
}

async fn create_floorplan<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<FloorplanBody>,
) -> ApiResult<(StatusCode, Json<PlaceFloorplan>)> {
    let floorplan = state
        .floorplans()
        .create(CreateFloorplan {
            site_id,
            place_id: body.place_id,
            title: body.title,
            image_url: body.image_url,
            sort_order: body.sort_order,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(floorplan)))
}

async fn get_floorplan<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<PlaceFloorplan>> {
    Ok(Json(state.floorplans().get(site_id, id).await?))
}

async fn update_floorplan<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdateFloorplan>,
) -> ApiResult<Json<PlaceFloorplan>> {
    Ok(Json(state.floorplans().update(site_id, id, input).await?))
}

async fn delete_floorplan<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.floorplans().delete(site_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Pins --------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PinBody {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: String,
    pub sort_order: Option<i64>,
}

async fn list_pins<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, floorplan_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<FloorplanPin>>> {
    Ok(Json(state.floorplans().list_pins(site_id, floorplan_id).await?))
}

async fn create_pin<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, floorplan_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<PinBody>,
) -> ApiResult<(StatusCode, Json<FloorplanPin>)> {
    let pin = state
        .floorplans()
        .create_pin(CreatePin {
            site_id,
            floorplan_id,
            x: body.x,
            y: body.y,
            label: body.label,
            sort_order: body.sort_order,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(pin)))
}

async fn update_pin<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, floorplan_id, id)): ApiPath<(Uuid, Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdatePin>,
) -> ApiResult<Json<FloorplanPin>> {
    Ok(Json(
        state
            .floorplans()
            .update_pin(site_id, floorplan_id, id, input)
            .await?,
    ))
}

async fn delete_pin<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, floorplan_id, id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .floorplans()
        .delete_pin(site_id, floorplan_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
