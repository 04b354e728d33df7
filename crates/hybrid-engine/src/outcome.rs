//! Tagged view of run results.
//!
//! The runtime folds entry-point failures into a success-shaped payload
//! `{"error": "<message>"}`. [`ScriptOutcome`] recovers the distinction for
//! callers that want it, and [`ScriptOutcome::into_payload`] turns it back
//! into the folded shape.

use serde::Serialize;
use serde_json::{Map, Value};

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ScriptOutcome {
    /// The entry point returned this value.
    Completed(Value),
    /// The entry point raised; the message is never empty.
    Failed(String),
}

impl ScriptOutcome {
    /// Classifies a folded payload: a top-level object with an `error` key
    /// is a failure, anything else is a completed value.
    ///
    /// A script that legitimately returns an object with an `error` key is
    /// indistinguishable from a failure.
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Object(map) if map.contains_key("error") => {
                ScriptOutcome::Failed(error_message(&map["error"]))
            }
            other => ScriptOutcome::Completed(other),
        }
    }

    /// Converts back to the folded payload shape.
    pub fn into_payload(self) -> Value {
        match self {
            ScriptOutcome::Completed(value) => value,
            ScriptOutcome::Failed(message) => {
                let mut map = Map::new();
                map.insert("error".to_string(), Value::String(message));
                Value::Object(map)
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ScriptOutcome::Failed(_))
    }
}

fn error_message(value: &Value) -> String {
    let message = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if message.is_empty() {
        "script failed".to_string()
    } else {
        message
    }
}
