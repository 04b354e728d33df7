//! Coordinator error types.
//!
//! Only setup, precondition, and storage failures surface here. Package
//! provisioning failures are logged and swallowed, and failures raised by a
//! script's entry point are folded into the run result instead.

use hybrid_core::ScriptId;
use hybrid_storage::StorageError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::runtime::RuntimeError;

/// Errors produced by [`crate::Engine`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine has not reached the state the operation requires.
    #[error("engine not initialized; call init() first")]
    NotInitialized,

    /// Runtime setup failed; the engine is permanently unusable.
    #[error("engine initialization failed: {0}")]
    InitFailed(String),

    /// The descriptor cannot be installed (e.g. it has no code).
    #[error("invalid script: {0}")]
    InvalidScript(String),

    #[error("script '{0}' not found; install it first")]
    ScriptNotFound(ScriptId),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The runtime rejected the script source itself (e.g. a syntax error).
    #[error("script error: {0}")]
    Script(String),

    /// The runtime failed outside of script code (I/O, protocol).
    #[error("runtime error: {0}")]
    Runtime(RuntimeError),

    /// The runtime returned text that is not JSON.
    #[error("malformed script result: {0}")]
    MalformedResult(String),
}

impl From<RuntimeError> for EngineError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::Script(message) => EngineError::Script(message),
            other => EngineError::Runtime(other),
        }
    }
}
