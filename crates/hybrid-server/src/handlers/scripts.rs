//! Installed-script handlers (install, list, search, run, uninstall) and the
//! provisioned-package listing.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;

use hybrid_core::{ScriptDescriptor, ScriptId, ScriptRecord};
use hybrid_engine::InstallReceipt;

use crate::error::ApiError;
use crate::schema::scripts::{
    InstalledResponse, PackageListResponse, ScriptListResponse, ScriptSearchQuery,
    UninstallResponse,
};
use crate::state::AppState;

/// `GET /scripts`
pub async fn list_scripts(
    State(state): State<AppState>,
) -> Result<Json<ScriptListResponse>, ApiError> {
    let scripts = state.engine.list_scripts().await?;
    Ok(Json(ScriptListResponse { scripts }))
}

/// Packages provisioned so far. Answers in every engine state.
///
/// `GET /packages`
pub async fn list_packages(
    State(state): State<AppState>,
) -> Result<Json<PackageListResponse>, ApiError> {
    let packages = state.engine.provisioned_packages().await?;
    Ok(Json(PackageListResponse { packages }))
}

/// `GET /scripts/search?q=`
pub async fn search_scripts(
    State(state): State<AppState>,
    Query(query): Query<ScriptSearchQuery>,
) -> Result<Json<ScriptListResponse>, ApiError> {
    let scripts = state.engine.search_scripts(&query.q).await?;
    Ok(Json(ScriptListResponse { scripts }))
}

/// `GET /scripts/{id}`
pub async fn get_script(
    State(state): State<AppState>,
    Path(id): Path<ScriptId>,
) -> Result<Json<ScriptRecord>, ApiError> {
    state
        .engine
        .get_script(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("script '{}' is not installed", id)))
}

/// Installs or replaces a script. The path id wins over any `id` in the body.
///
/// `PUT /scripts/{id}`
pub async fn install_script(
    State(state): State<AppState>,
    Path(id): Path<ScriptId>,
    Json(descriptor): Json<ScriptDescriptor>,
) -> Result<Json<InstallReceipt>, ApiError> {
    let receipt = state.engine.install_script(&id, descriptor).await?;
    Ok(Json(receipt))
}

/// `DELETE /scripts/{id}`
pub async fn uninstall_script(
    State(state): State<AppState>,
    Path(id): Path<ScriptId>,
) -> Result<Json<UninstallResponse>, ApiError> {
    let success = state.engine.uninstall_script(&id).await?;
    Ok(Json(UninstallResponse { success, id }))
}

/// `GET /scripts/{id}/installed`
pub async fn is_installed(
    State(state): State<AppState>,
    Path(id): Path<ScriptId>,
) -> Result<Json<InstalledResponse>, ApiError> {
    let installed = state.engine.is_installed(&id).await?;
    Ok(Json(InstalledResponse { id, installed }))
}

/// Runs a script with the request body as input.
///
/// A script that raises still answers 200 with an `{"error": ...}` body.
///
/// `POST /scripts/{id}/run`
pub async fn run_script(
    State(state): State<AppState>,
    Path(id): Path<ScriptId>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let result = state.engine.run_script(&id, input).await?;
    Ok(Json(result))
}
