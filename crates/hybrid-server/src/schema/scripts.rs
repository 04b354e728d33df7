//! Installed-script request/response types.

use serde::{Deserialize, Serialize};

use hybrid_core::{ScriptId, ScriptRecord};
use hybrid_engine::{EngineState, ProvisionedPackage};

/// Response for listing or searching installed scripts.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptListResponse {
    pub scripts: Vec<ScriptRecord>,
}

/// Query for `GET /scripts/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptSearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UninstallResponse {
    pub success: bool,
    pub id: ScriptId,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstalledResponse {
    pub id: ScriptId,
    pub installed: bool,
}

/// Response for `GET /packages`.
#[derive(Debug, Clone, Serialize)]
pub struct PackageListResponse {
    pub packages: Vec<ProvisionedPackage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub engine: EngineState,
}
