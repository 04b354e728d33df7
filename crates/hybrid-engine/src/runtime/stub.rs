//! Deterministic in-process runtime.
//!
//! [`StubRuntime`] resolves script source text to native Rust handlers
//! registered ahead of time, so the coordinator can be exercised without an
//! interpreter. Source that was never registered loads fine but defines
//! nothing, so calling into it folds a "not defined" error, the same as a
//! real interpreter would. Only packages registered as available can be
//! installed.
//!
//! Every call is appended to a shared event log (see [`StubRuntime::events`]),
//! which survives cloning and handing the runtime to a loader.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{RuntimeConfig, RuntimeError, RuntimeLoader, ScriptRuntime};

/// A native entry point: receives the bound argument, returns a value or an
/// error message.
pub type Handler = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// One observable runtime interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubEvent {
    Install(String),
    Execute(String),
    Bind(String),
    CallStart(String),
    CallEnd(String),
}

#[derive(Clone, Default)]
struct Program {
    entry_points: HashMap<String, Handler>,
}

/// In-process runtime backed by registered Rust handlers.
#[derive(Clone, Default)]
pub struct StubRuntime {
    programs: HashMap<String, Program>,
    broken_sources: HashMap<String, String>,
    packages: HashSet<String>,
    call_delay: Option<Duration>,
    current: Option<Program>,
    globals: HashMap<String, Value>,
    events: Arc<Mutex<Vec<StubEvent>>>,
}

impl StubRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` as `entry_point` of the script whose source is
    /// `source` (compared after trimming).
    pub fn with_entry_point<F>(mut self, source: &str, entry_point: &str, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.programs
            .entry(source.trim().to_string())
            .or_default()
            .entry_points
            .insert(entry_point.to_string(), Arc::new(handler));
        self
    }

    /// Makes loading `source` fail as if it did not parse.
    pub fn with_broken_source(mut self, source: &str, message: &str) -> Self {
        self.broken_sources
            .insert(source.trim().to_string(), message.to_string());
        self
    }

    /// Marks a package as installable.
    pub fn with_package(mut self, name: &str) -> Self {
        self.packages.insert(name.to_string());
        self
    }

    /// Makes every call take at least `delay`, to widen race windows.
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    /// Snapshot of the shared event log.
    pub fn events(&self) -> Vec<StubEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn record(&self, event: StubEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl ScriptRuntime for StubRuntime {
    async fn install_package(&mut self, name: &str) -> Result<(), RuntimeError> {
        self.record(StubEvent::Install(name.to_string()));
        if self.packages.contains(name) {
            Ok(())
        } else {
            Err(RuntimeError::PackageInstall {
                package: name.to_string(),
                reason: format!("no matching distribution found for {}", name),
            })
        }
    }

    async fn execute(&mut self, source: &str) -> Result<(), RuntimeError> {
        let key = source.trim();
        self.record(StubEvent::Execute(key.to_string()));
        if let Some(message) = self.broken_sources.get(key) {
            return Err(RuntimeError::Script(message.clone()));
        }
        self.globals.clear();
        self.current = Some(self.programs.get(key).cloned().unwrap_or_default());
        Ok(())
    }

    async fn bind_global(&mut self, name: &str, value: &Value) -> Result<(), RuntimeError> {
        self.record(StubEvent::Bind(name.to_string()));
        self.globals.insert(name.to_string(), value.clone());
        Ok(())
    }

    async fn call(&mut self, entry_point: &str, arg: &str) -> Result<String, RuntimeError> {
        self.record(StubEvent::CallStart(entry_point.to_string()));
        if let Some(delay) = self.call_delay {
            tokio::time::sleep(delay).await;
        }

        let handler = self
            .current
            .as_ref()
            .and_then(|program| program.entry_points.get(entry_point))
            .cloned();
        let input = self.globals.get(arg).cloned().unwrap_or(Value::Null);
        let folded = match handler {
            Some(handler) => match handler(&input) {
                Ok(value) => value,
                Err(message) => json!({ "error": message }),
            },
            None => json!({ "error": format!("name '{}' is not defined", entry_point) }),
        };

        self.record(StubEvent::CallEnd(entry_point.to_string()));
        serde_json::to_string(&folded)
            .map_err(|e| RuntimeError::Protocol(format!("unencodable result: {}", e)))
    }
}

/// Hands out clones of a prototype [`StubRuntime`], or fails on demand.
#[derive(Clone, Default)]
pub struct StubLoader {
    prototype: StubRuntime,
    failure: Option<String>,
}

impl StubLoader {
    pub fn new(prototype: StubRuntime) -> Self {
        StubLoader {
            prototype,
            failure: None,
        }
    }

    /// A loader whose every load fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        StubLoader {
            prototype: StubRuntime::new(),
            failure: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl RuntimeLoader for StubLoader {
    async fn load(&self, _config: &RuntimeConfig) -> Result<Box<dyn ScriptRuntime>, RuntimeError> {
        match &self.failure {
            Some(reason) => Err(RuntimeError::Init(reason.clone())),
            None => Ok(Box::new(self.prototype.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_entry_point_runs() {
        let mut rt = StubRuntime::new().with_entry_point("echo", "main", |v| Ok(v.clone()));
        rt.execute("echo").await.unwrap();
        rt.bind_global("_input", &json!({"x": 1})).await.unwrap();
        let text = rt.call("main", "_input").await.unwrap();
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!({"x": 1}));
    }

    #[tokio::test]
    async fn unknown_source_folds_missing_entry_point() {
        let mut rt = StubRuntime::new();
        rt.execute("print('hi')").await.unwrap();
        let text = rt.call("main", "_input").await.unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({"error": "name 'main' is not defined"})
        );
    }

    #[tokio::test]
    async fn handler_error_is_folded() {
        let mut rt =
            StubRuntime::new().with_entry_point("boom", "main", |_| Err("division by zero".into()));
        rt.execute("boom").await.unwrap();
        let text = rt.call("main", "_input").await.unwrap();
        assert_eq!(text, r#"{"error":"division by zero"}"#);
    }

    #[tokio::test]
    async fn broken_source_and_missing_package_fail() {
        let mut rt = StubRuntime::new()
            .with_broken_source("def (", "invalid syntax")
            .with_package("numpy");
        assert!(matches!(rt.execute("def (").await, Err(RuntimeError::Script(m)) if m == "invalid syntax"));
        assert!(rt.install_package("numpy").await.is_ok());
        assert!(matches!(
            rt.install_package("nope").await,
            Err(RuntimeError::PackageInstall { .. })
        ));
    }

    #[tokio::test]
    async fn clones_share_event_log() {
        let rt = StubRuntime::new();
        let mut clone = rt.clone();
        clone.bind_global("a", &Value::Null).await.unwrap();
        assert_eq!(rt.events(), vec![StubEvent::Bind("a".into())]);
    }
}
