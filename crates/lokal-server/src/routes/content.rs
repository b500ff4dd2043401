//! Site content administration: legal pages and price bands.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use lokal_core::models::legal_page::{
    LegalPage, LegalPageKey, LegalPageTranslation, UpsertLegalTranslation,
};
use lokal_core::models::price_band::{CreatePriceBand, PriceBand, UpdatePriceBand};
use lokal_entitlements::legal::LegalPageDetail;
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, parse_lang};
use crate::state::AppState;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/sites/{site_id}/legal-pages", get(list_legal::<C>))
        .route(
            "/sites/{site_id}/legal-pages/{page}",
            get(get_legal::<C>).delete(delete_legal::<C>),
        )
        .route(
            "/sites/{site_id}/legal-pages/{page}/active",
            put(set_legal_active::<C>),
        )
        .route(
            "/sites/{site_id}/legal-pages/{page}/translations/{lang}",
            put(upsert_legal_translation::<C>),
        )
        .route(
            "/sites/{site_id}/price-bands",
            get(list_price_bands::<C>).post(create_price_band::<C>),
        )
        .route(
            "/sites/{site_id}/price-bands/{id}",
            patch(update_price_band::<C>).delete(delete_price_band::<C>),
        )
}

// -- Legal pages -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
    pub is_active: bool,
}

async fn list_legal<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<LegalPage>>> {
    Ok(Json(state.legal_pages().list(site_id).await?))
}

async fn get_legal<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, page)): ApiPath<(Uuid, String)>,
) -> ApiResult<Json<LegalPageDetail>> {
    let page_key: LegalPageKey = page.parse()?;
    Ok(Json(state.legal_pages().get(site_id, page_key).await?))
}

async fn delete_legal<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, page)): ApiPath<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    let page_key: LegalPageKey = page.parse()?;
    state.legal_pages().delete(site_id, page_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_legal_active<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, page)): ApiPath<(Uuid, String)>,
    ApiJson(body): ApiJson<ActiveBody>,
) -> ApiResult<Json<LegalPage>> {
    let page_key: LegalPageKey = page.parse()?;
    Ok(Json(
        state
            .legal_pages()
            .set_active(site_id, page_key, body.is_active)
            .await?,
    ))
}

async fn upsert_legal_translation<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, page, lang)): ApiPath<(Uuid, String, String)>,
    ApiJson(input): ApiJson<UpsertLegalTranslation>,
) -> ApiResult<Json<LegalPageTranslation>> {
    let page_key: LegalPageKey = page.parse()?;
    let lang = parse_lang(&lang)?;
    Ok(Json(
        state
            .legal_pages()
            .upsert_translation(site_id, page_key, lang, input)
            .await?,
    ))
}

// -- Price bands -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PriceBandBody {
    pub key: String,
    pub label: String,
    pub min_price: u32,
    pub max_price: Option<u32>,
    pub currency: Option<String>,
    pub sort_order: Option<i64>,
}

async fn list_price_bands<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<PriceBand>>> {
    Ok(Json(state.catalog().list_price_bands(site_id).await?))
}

async fn create_price_band<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(site_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<PriceBandBody>,
) -> ApiResult<(StatusCode, Json<PriceBand>)> {
    let band = state
        .catalog()
        .create_price_band(CreatePriceBand {
            site_id,
            key: body.key,
            label: body.label,
            min_price: body.min_price,
            max_price: body.max_price,
            currency: body.currency,
            sort_order: body.sort_order,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(band)))
}

async fn update_price_band<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdatePriceBand>,
) -> ApiResult<Json<PriceBand>> {
    Ok(Json(
        state.catalog().update_price_band(site_id, id, input).await?,
    ))
}

async fn delete_price_band<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((site_id, id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.catalog().delete_price_band(site_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
