//! Script identity.
//!
//! [`ScriptId`] is the primary key of the script store. It is supplied by the
//! caller or by the catalog, never generated, and must be non-empty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Unique identifier of an installed (or installable) script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScriptId(String);

impl ScriptId {
    /// Creates an id, rejecting empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CoreError::InvalidId {
                reason: "script id must not be empty".to_string(),
            });
        }
        Ok(ScriptId(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ScriptId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ScriptId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScriptId::new(s)
    }
}

impl TryFrom<String> for ScriptId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ScriptId::new(value)
    }
}

impl From<ScriptId> for String {
    fn from(id: ScriptId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_ids() {
        assert!(ScriptId::new("").is_err());
        assert!(ScriptId::new("   ").is_err());
        assert_eq!(ScriptId::new("hello-world").unwrap().as_str(), "hello-world");
    }

    #[test]
    fn deserialization_enforces_non_empty() {
        let ok: ScriptId = serde_json::from_str("\"invoice-reader\"").unwrap();
        assert_eq!(ok.to_string(), "invoice-reader");

        let err = serde_json::from_str::<ScriptId>("\"\"");
        assert!(err.is_err());
    }
}
