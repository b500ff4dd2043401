//! HTTP routes.
//!
//! Public endpoints live under `/api/{lang}` and `/api/public/{lang}`;
//! administration endpoints under `/api/admin`.

pub mod collections;
pub mod content;
pub mod feature_subscriptions;
pub mod health;
pub mod places;
pub mod public;
pub mod sites;

use axum::Router;
use axum::routing::get;
use surrealdb::Connection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn build_router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health::health_check::<C>))
        .merge(public::router())
        .nest("/api/admin", admin_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn admin_routes<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .merge(sites::router())
        .merge(feature_subscriptions::router())
        .merge(places::router())
        .merge(content::router())
        .merge(collections::router())
}
