use axum::extract::State;
use axum::Json;

use crate::schema::scripts::HealthResponse;
use crate::state::AppState;

/// Reports the engine state. Always 200, even when the engine failed.
///
/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        engine: state.engine.state(),
    })
}
