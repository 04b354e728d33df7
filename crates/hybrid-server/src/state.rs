//! Application state shared by all handlers.
//!
//! The engine serializes its own store and runtime access, so the state is
//! a plain `Arc<Engine>` with no outer lock.

use std::sync::Arc;

use hybrid_engine::{Engine, EngineConfig, EngineError};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        AppState {
            engine: Arc::new(engine),
        }
    }

    /// Builds an uninitialized engine from `config`. Call `init` on
    /// `state.engine` before serving runs.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(AppState::new(Engine::from_config(config)?))
    }
}
