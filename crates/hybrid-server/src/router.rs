//! Router assembly for the hybrid HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax. `/scripts/search` takes
/// precedence over `/scripts/{id}`, so no script can be addressed as
/// `search` through the single-script routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Installed scripts
        .route("/scripts", get(handlers::scripts::list_scripts))
        .route("/scripts/search", get(handlers::scripts::search_scripts))
        .route(
            "/scripts/{id}",
            get(handlers::scripts::get_script)
                .put(handlers::scripts::install_script)
                .delete(handlers::scripts::uninstall_script),
        )
        .route(
            "/scripts/{id}/installed",
            get(handlers::scripts::is_installed),
        )
        .route("/scripts/{id}/run", post(handlers::scripts::run_script))
        .route("/packages", get(handlers::scripts::list_packages))
        // Catalog
        .route("/catalog", get(handlers::catalog::search_catalog))
        .route("/catalog/popular", get(handlers::catalog::popular_scripts))
        .route(
            "/catalog/{id}/install",
            post(handlers::catalog::install_from_catalog),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
