//! The runtime capability: an interpreter that loads script source, binds
//! JSON values into its context, and calls a named entry point.
//!
//! The coordinator treats the runtime as a black box behind two traits:
//! - [`RuntimeLoader`] brings a runtime up from a [`RuntimeConfig`]
//! - [`ScriptRuntime`] is the loaded instance
//!
//! Implementations:
//! - [`python::PythonRuntime`]: a long-lived Python interpreter process
//! - [`stub::StubRuntime`]: an in-process runtime dispatching to Rust handlers

pub mod python;
pub mod stub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use python::{PythonLoader, PythonRuntime};
pub use stub::{StubEvent, StubLoader, StubRuntime};

/// Settings recognized when loading a runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Where the runtime is loaded from. For the Python runtime this is the
    /// interpreter executable.
    pub source_url: String,
    /// Eagerly load the language's standard library at start.
    pub load_standard_library: bool,
    /// Packages provisioned during initialization. A failure here fails
    /// initialization, unlike per-script packages.
    pub preinstalled_packages: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            source_url: "python3".to_string(),
            load_standard_library: false,
            preinstalled_packages: Vec::new(),
        }
    }
}

/// Errors raised by a runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The runtime could not be started.
    #[error("runtime initialization failed: {0}")]
    Init(String),

    #[error("failed to install package '{package}': {reason}")]
    PackageInstall { package: String, reason: String },

    /// Loading script source failed (syntax error, top-level exception).
    #[error("{0}")]
    Script(String),

    /// The runtime answered something unexpected, or went away.
    #[error("runtime protocol error: {0}")]
    Protocol(String),

    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A loaded runtime instance with one execution context.
///
/// Calls mutate the shared context, so callers must not interleave the
/// `execute` / `bind_global` / `call` sequences of different runs.
#[async_trait]
pub trait ScriptRuntime: Send {
    /// Provisions a package so scripts can import it.
    async fn install_package(&mut self, name: &str) -> Result<(), RuntimeError>;

    /// Loads script source into the execution context.
    async fn execute(&mut self, source: &str) -> Result<(), RuntimeError>;

    /// Binds a JSON value into the execution context under `name`.
    async fn bind_global(&mut self, name: &str, value: &Value) -> Result<(), RuntimeError>;

    /// Invokes `entry_point` with the global `arg` and returns the result as
    /// JSON text.
    ///
    /// If the entry point raises, is missing, or returns something that is
    /// not JSON-serializable, the text is `{"error": "<message>"}`; this is
    /// not reported as an `Err`.
    async fn call(&mut self, entry_point: &str, arg: &str) -> Result<String, RuntimeError>;
}

/// Brings a runtime up.
#[async_trait]
pub trait RuntimeLoader: Send + Sync {
    async fn load(&self, config: &RuntimeConfig) -> Result<Box<dyn ScriptRuntime>, RuntimeError>;
}
