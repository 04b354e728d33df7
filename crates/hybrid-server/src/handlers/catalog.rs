//! Catalog discovery handlers.

use axum::extract::{Path, Query, State};
use axum::Json;

use hybrid_core::ScriptId;
use hybrid_engine::InstallReceipt;

use crate::error::ApiError;
use crate::schema::catalog::{CatalogListResponse, CatalogSearchQuery, PopularQuery};
use crate::state::AppState;

/// `GET /catalog?q=&category=`
pub async fn search_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogSearchQuery>,
) -> Result<Json<CatalogListResponse>, ApiError> {
    let scripts = state
        .engine
        .search_catalog(&query.q, &query.category)
        .await?;
    Ok(Json(CatalogListResponse { scripts }))
}

/// `GET /catalog/popular?limit=`
pub async fn popular_scripts(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<CatalogListResponse>, ApiError> {
    let scripts = state.engine.popular_scripts(query.limit).await?;
    Ok(Json(CatalogListResponse { scripts }))
}

/// `POST /catalog/{id}/install`
pub async fn install_from_catalog(
    State(state): State<AppState>,
    Path(id): Path<ScriptId>,
) -> Result<Json<InstallReceipt>, ApiError> {
    let receipt = state.engine.install_from_catalog(&id).await?;
    Ok(Json(receipt))
}
