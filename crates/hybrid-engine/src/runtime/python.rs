//! Python interpreter process runtime.
//!
//! [`PythonLoader`] spawns `<source_url> -u -c <driver>` and keeps the child
//! alive for the lifetime of the [`PythonRuntime`]. Requests and replies are
//! single-line JSON objects over stdin/stdout:
//!
//! ```text
//! -> {"op": "exec", "source": "def main(input): ..."}
//! <- {"ok": true, "value": null}
//! -> {"op": "call", "entry": "main", "arg": "_input"}
//! <- {"ok": true, "value": "{\"x\": 1}"}
//! ```
//!
//! Every `exec` starts from a fresh namespace, so definitions from one script
//! never leak into the next. Script output written with `print` goes to the
//! child's stderr, which is inherited, and scripts read an empty stdin.
//!
//! A request abandoned between writing and reading its reply leaves that
//! reply in the pipe. The runtime then refuses every later request rather
//! than hand one caller another caller's reply.

use std::collections::HashSet;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::{RuntimeConfig, RuntimeError, RuntimeLoader, ScriptRuntime};

const DRIVER: &str = include_str!("driver.py");

#[derive(Debug, Deserialize)]
struct DriverReply {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Loads [`PythonRuntime`]s.
#[derive(Debug, Clone, Default)]
pub struct PythonLoader;

#[async_trait]
impl RuntimeLoader for PythonLoader {
    async fn load(&self, config: &RuntimeConfig) -> Result<Box<dyn ScriptRuntime>, RuntimeError> {
        let runtime = PythonRuntime::spawn(config).await?;
        Ok(Box::new(runtime))
    }
}

/// A running Python interpreter driven over a JSON-lines pipe.
pub struct PythonRuntime {
    // Held so the process is killed when the runtime is dropped.
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    provisioned: HashSet<String>,
    // Set while a request awaits its reply; still set if that wait was dropped.
    in_flight: bool,
}

impl PythonRuntime {
    /// Starts the interpreter and waits for it to answer a ping.
    pub async fn spawn(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let mut command = Command::new(&config.source_url);
        command
            .arg("-u")
            .arg("-c")
            .arg(DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if config.load_standard_library {
            command.arg("--preload-stdlib");
        }

        let mut child = command.spawn().map_err(|e| {
            RuntimeError::Init(format!("failed to start '{}': {}", config.source_url, e))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RuntimeError::Init("interpreter stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Init("interpreter stdout unavailable".to_string()))?;

        let mut runtime = PythonRuntime {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            provisioned: HashSet::new(),
            in_flight: false,
        };
        match runtime.request(json!({ "op": "ping" })).await {
            Ok(Ok(_)) => {}
            Ok(Err(reason)) => {
                return Err(RuntimeError::Init(format!("interpreter rejected ping: {}", reason)))
            }
            Err(e) => {
                return Err(RuntimeError::Init(format!("interpreter did not answer: {}", e)))
            }
        }
        tracing::debug!(interpreter = %config.source_url, "python runtime started");
        Ok(runtime)
    }

    /// Sends one request and waits for its reply.
    ///
    /// `Ok(Err(message))` is a failure reported by the driver; `Err` is a
    /// broken pipe or an unreadable reply.
    async fn request(&mut self, request: Value) -> Result<Result<Value, String>, RuntimeError> {
        if self.in_flight {
            return Err(RuntimeError::Protocol(
                "an earlier request was abandoned before its reply; runtime must be restarted"
                    .to_string(),
            ));
        }
        let mut line = serde_json::to_string(&request)
            .map_err(|e| RuntimeError::Protocol(format!("unencodable request: {}", e)))?;
        line.push('\n');
        self.in_flight = true;
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let reply = self
            .stdout
            .next_line()
            .await?
            .ok_or_else(|| RuntimeError::Protocol("interpreter exited".to_string()))?;
        self.in_flight = false;
        let reply: DriverReply = serde_json::from_str(&reply)
            .map_err(|e| RuntimeError::Protocol(format!("unreadable reply: {}", e)))?;

        if reply.ok {
            Ok(Ok(reply.value))
        } else {
            Ok(Err(reply
                .error
                .unwrap_or_else(|| "unknown interpreter error".to_string())))
        }
    }
}

#[async_trait]
impl ScriptRuntime for PythonRuntime {
    async fn install_package(&mut self, name: &str) -> Result<(), RuntimeError> {
        if self.provisioned.contains(name) {
            return Ok(());
        }
        match self.request(json!({ "op": "install", "name": name })).await? {
            Ok(_) => {
                self.provisioned.insert(name.to_string());
                Ok(())
            }
            Err(reason) => Err(RuntimeError::PackageInstall {
                package: name.to_string(),
                reason,
            }),
        }
    }

    async fn execute(&mut self, source: &str) -> Result<(), RuntimeError> {
        self.request(json!({ "op": "exec", "source": source }))
            .await?
            .map(|_| ())
            .map_err(RuntimeError::Script)
    }

    async fn bind_global(&mut self, name: &str, value: &Value) -> Result<(), RuntimeError> {
        self.request(json!({ "op": "bind", "name": name, "value": value }))
            .await?
            .map(|_| ())
            .map_err(RuntimeError::Protocol)
    }

    async fn call(&mut self, entry_point: &str, arg: &str) -> Result<String, RuntimeError> {
        let value = self
            .request(json!({ "op": "call", "entry": entry_point, "arg": arg }))
            .await?
            .map_err(RuntimeError::Protocol)?;
        match value {
            Value::String(text) => Ok(text),
            other => Err(RuntimeError::Protocol(format!(
                "expected JSON text from call, got {}",
                other
            ))),
        }
    }
}
