//! Cross-site collections and their items.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use lokal_core::models::collection::{
    Collection, CollectionItem, CreateCollection, CreateCollectionItem, UpdateCollection,
    UpdateCollectionItem,
};
use lokal_core::repository::PaginatedResult;
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, PageQuery};
use crate::state::AppState;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/collections", get(list::<C>).post(create::<C>))
        .route(
            "/collections/{id}",
            get(get_one::<C>).patch(update::<C>).delete(delete::<C>),
        )
        .route(
            "/collections/{id}/items",
            get(list_items::<C>).post(add_item::<C>),
        )
        .route(
            "/collections/{id}/items/{item_id}",
            patch(update_item::<C>).delete(remove_item::<C>),
        )
}

async fn list<C: Connection>(
    State(state): State<AppState<C>>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<Collection>>> {
    Ok(Json(state.catalog().list_collections(page.pagination()).await?))
}

async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    ApiJson(input): ApiJson<CreateCollection>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let collection = state.catalog().create_collection(input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

async fn get_one<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Collection>> {
    Ok(Json(state.catalog().get_collection(id).await?))
}

async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateCollection>,
) -> ApiResult<Json<Collection>> {
    Ok(Json(state.catalog().update_collection(id, input).await?))
}

async fn delete<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.catalog().delete_collection(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_items<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<CollectionItem>>> {
    Ok(Json(state.catalog().list_items(id).await?))
}

async fn add_item<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CreateCollectionItem>,
) -> ApiResult<(StatusCode, Json<CollectionItem>)> {
    let item = state.catalog().add_item(id, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((id, item_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdateCollectionItem>,
) -> ApiResult<Json<CollectionItem>> {
    Ok(Json(state.catalog().update_item(id, item_id, input).await?))
}

async fn remove_item<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((id, item_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.catalog().remove_item(id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
