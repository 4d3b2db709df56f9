//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Reviews for a game name
        .route("/games/:game", get(handlers::game_reviews))
        // Latest reviewed titles
        .route("/latest-games-reviewed", get(handlers::latest_reviewed))
        .route(
            "/latest-games-reviewed/:platform",
            get(handlers::latest_reviewed_for_platform),
        )
        // Release calendar
        .route("/releases", get(handlers::releases_this_month))
        .route("/releases/:year/:month", get(handlers::releases))
        .route(
            "/releases/:year/:month/:platform",
            get(handlers::releases_for_platform),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
