//! Binary entrypoint for the hybrid HTTP server.
//!
//! Engine settings come from the environment (see
//! [`hybrid_engine::EngineConfig::from_env`]). The server adds:
//! - `HYBRID_PORT`: Server listen port (default: "3000")

use std::process::ExitCode;

use hybrid_engine::EngineConfig;
use hybrid_server::router::build_router;
use hybrid_server::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = EngineConfig::from_env();
    let port = std::env::var("HYBRID_PORT").unwrap_or_else(|_| "3000".to_string());

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(db = %config.db_path, error = %err, "failed to open script store");
            return ExitCode::FAILURE;
        }
    };

    // A failed init leaves the server up so /health can report why.
    if let Err(err) = state.engine.init().await {
        tracing::error!(error = %err, "engine unavailable; run endpoints will answer 503");
    }

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("hybrid server starting on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(addr = %addr, error = %err, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
