//! Axum wiring for the vitrine HTTP surface.
//!
//! Handlers translate HTTP verbs and bodies into registry operations and
//! serialize the results; every piece of domain logic lives in `services`.

pub mod banners;
pub mod cleanup;
pub mod dto;
pub mod error;
pub mod flyers;
pub mod middleware;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::json;
use services::{BannerRegistry, CleanupService, FlyerShelf};

pub use error::ApiError;

/// State shared across all handlers.
pub struct AppState {
    pub banners: Arc<BannerRegistry>,
    pub flyers: Arc<FlyerShelf>,
    pub cleanup: Arc<CleanupService>,
    /// When set, the cleanup routes demand this bearer token.
    pub cleanup_token: Option<SecretString>,
}

/// Configures the routes for the carousel API.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/banners",
            post(banners::create)
                .get(banners::list_displayable)
                .delete(banners::destroy),
        )
        .route("/banners/all", get(banners::list_all))
        .route("/banners/disabled", get(banners::list_disabled))
        .route("/banners/disable", put(banners::disable))
        .route("/banners/enable", put(banners::enable))
        .route("/banners/update-day", put(banners::update_day))
        .route("/banners/reorder", put(banners::reorder))
        .route("/banners/replace-order", put(banners::replace_order))
        // cron services differ on which verb they fire
        .route("/cleanup", get(cleanup::run_banners).post(cleanup::run_banners))
        .route(
            "/encartes",
            post(flyers::create).get(flyers::list).delete(flyers::destroy),
        )
        .route(
            "/encartes/cleanup",
            get(cleanup::run_flyers).post(cleanup::run_flyers),
        )
        .layer(middleware::trace_layer())
        .layer(middleware::cors_policy())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "ok" }))
}
