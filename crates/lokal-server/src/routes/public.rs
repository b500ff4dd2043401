//! Visitor-facing endpoints: entitlements, feature gates, legal pages,
//! slug resolution and curated collections.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use lokal_core::models::legal_page::LegalPageKey;
use lokal_entitlements::catalog::PublicCollection;
use lokal_entitlements::legal::PublicLegalPage;
use lokal_entitlements::{Entitlements, PlaceGates, ResolvedSlug};
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, SiteKeyQuery, parse_lang};
use crate::state::AppState;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/api/{lang}/entitlements", get(entitlements::<C>))
        .route("/api/{lang}/places/{place_id}/gates", get(place_gates::<C>))
        .route(
            "/api/public/{lang}/{site_key}/legal/{page}",
            get(legal_page::<C>),
        )
        .route(
            "/api/public/{lang}/{site_key}/resolve/{slug}",
            get(resolve_slug::<C>),
        )
        .route(
            "/api/public/{lang}/collections/{slug}",
            get(collection::<C>),
        )
}

/// Entitlements of the site addressed by `?siteKey=` (or the default
/// site).
async fn entitlements<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath(lang): ApiPath<String>,
    ApiQuery(query): ApiQuery<SiteKeyQuery>,
) -> ApiResult<Json<Entitlements>> {
    let lang = parse_lang(&lang)?;
    let site = state.resolver().resolve(lang, query.site_key()).await?;
    let entitlements = state.entitlements().get_by_site_id(site.site_id).await?;
    Ok(Json(entitlements))
}

async fn place_gates<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((lang, place_id)): ApiPath<(String, Uuid)>,
    ApiQuery(query): ApiQuery<SiteKeyQuery>,
) -> ApiResult<Json<PlaceGates>> {
    let lang = parse_lang(&lang)?;
    let site = state.resolver().resolve(lang, query.site_key()).await?;
    let gates = state.upsell().place_gates(site.site_id, place_id).await?;
    Ok(Json(gates))
}

async fn legal_page<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((lang, site_key, page)): ApiPath<(String, String, String)>,
) -> ApiResult<Json<PublicLegalPage>> {
    let lang = parse_lang(&lang)?;
    let page_key: LegalPageKey = page.parse()?;
    let page = state
        .legal_pages()
        .get_public(lang, Some(&site_key), page_key)
        .await?;
    Ok(Json(page))
}

async fn resolve_slug<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((lang, site_key, slug)): ApiPath<(String, String, String)>,
) -> ApiResult<Json<ResolvedSlug>> {
    let lang = parse_lang(&lang)?;
    let resolved = state.slugs().resolve(lang, Some(&site_key), &slug).await?;
    Ok(Json(resolved))
}

async fn collection<C: Connection>(
    State(state): State<AppState<C>>,
    ApiPath((lang, slug)): ApiPath<(String, String)>,
) -> ApiResult<Json<PublicCollection>> {
    let lang = parse_lang(&lang)?;
    let collection = state.catalog().public_collection(&slug, lang).await?;
    Ok(Json(collection))
}
