//! Installed script records and the descriptors they are built from.
//!
//! A [`ScriptDescriptor`] is what a caller or the catalog hands over at
//! install time: every field optional. [`ScriptDescriptor::into_fields`]
//! applies the install-time defaults and yields [`ScriptFields`], the typed
//! payload the store persists. The store adds the id and timestamps to form a
//! [`ScriptRecord`].
//!
//! JSON uses camelCase field names. The legacy `main` key is accepted as an
//! alias for `entryPoint`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::ScriptId;

/// Entry point invoked when a descriptor does not name one.
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Author recorded when a descriptor does not name one.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Version recorded when a descriptor does not name one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Every persisted field of a script except its id and timestamps.
///
/// This is the explicit update payload for the store: a save replaces all of
/// these fields at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptFields {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    /// Script source text, opaque to the store.
    pub code: String,
    /// Name of the callable the runtime invokes.
    pub entry_point: String,
    /// Packages provisioned, in order, before each run.
    pub packages: Vec<String>,
}

/// A script as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRecord {
    pub id: ScriptId,
    #[serde(flatten)]
    pub fields: ScriptFields,
    /// Epoch milliseconds of the first install.
    pub installed_at: i64,
    /// Epoch milliseconds of the most recent save.
    pub updated_at: i64,
}

impl ScriptRecord {
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn code(&self) -> &str {
        &self.fields.code
    }

    pub fn entry_point(&self) -> &str {
        &self.fields.entry_point
    }

    pub fn packages(&self) -> &[String] {
        &self.fields.packages
    }
}

/// An installable script before it reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScriptId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, alias = "main", skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
}

impl ScriptDescriptor {
    /// A descriptor carrying only source code; everything else defaults.
    pub fn with_code(code: impl Into<String>) -> Self {
        ScriptDescriptor {
            code: Some(code.into()),
            ..Default::default()
        }
    }

    /// Applies install-time defaults and produces the persisted fields.
    ///
    /// Empty strings count as absent, so `name: ""` still defaults to the id.
    /// Fails with [`CoreError::InvalidScript`] when no code is present.
    pub fn into_fields(self, id: &ScriptId) -> Result<ScriptFields, CoreError> {
        let code = match self.code {
            Some(code) if !code.trim().is_empty() => code,
            _ => {
                return Err(CoreError::InvalidScript {
                    reason: format!("script '{}' has no code", id),
                })
            }
        };

        Ok(ScriptFields {
            name: non_empty(self.name).unwrap_or_else(|| id.to_string()),
            description: self.description.unwrap_or_default(),
            author: non_empty(self.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            version: non_empty(self.version).unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            code,
            entry_point: non_empty(self.entry_point)
                .unwrap_or_else(|| DEFAULT_ENTRY_POINT.to_string()),
            packages: self.packages.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ScriptId {
        ScriptId::new(raw).unwrap()
    }

    #[test]
    fn defaults_apply_to_missing_fields() {
        let fields = ScriptDescriptor::with_code("def main(input): return input")
            .into_fields(&id("echo"))
            .unwrap();

        assert_eq!(fields.name, "echo");
        assert_eq!(fields.description, "");
        assert_eq!(fields.author, DEFAULT_AUTHOR);
        assert_eq!(fields.version, DEFAULT_VERSION);
        assert_eq!(fields.entry_point, DEFAULT_ENTRY_POINT);
        assert!(fields.packages.is_empty());
    }

    #[test]
    fn supplied_fields_are_kept() {
        let descriptor = ScriptDescriptor {
            name: Some("Invoice Reader".into()),
            description: Some("Extract data".into()),
            author: Some("Hybrid Labs".into()),
            version: Some("2.1.0".into()),
            code: Some("def run(x): return x".into()),
            entry_point: Some("run".into()),
            packages: Some(vec!["numpy".into(), "pandas".into()]),
            ..Default::default()
        };
        let fields = descriptor.into_fields(&id("invoice-reader")).unwrap();

        assert_eq!(fields.name, "Invoice Reader");
        assert_eq!(fields.author, "Hybrid Labs");
        assert_eq!(fields.version, "2.1.0");
        assert_eq!(fields.entry_point, "run");
        assert_eq!(fields.packages, vec!["numpy", "pandas"]);
    }

    #[test]
    fn missing_or_blank_code_is_rejected() {
        let err = ScriptDescriptor::default().into_fields(&id("x")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidScript { .. }));

        let err = ScriptDescriptor::with_code("   \n")
            .into_fields(&id("x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidScript { .. }));
    }

    #[test]
    fn empty_strings_fall_back_to_defaults() {
        let descriptor = ScriptDescriptor {
            name: Some(String::new()),
            entry_point: Some(String::new()),
            code: Some("x = 1".into()),
            ..Default::default()
        };
        let fields = descriptor.into_fields(&id("blank")).unwrap();
        assert_eq!(fields.name, "blank");
        assert_eq!(fields.entry_point, "main");
    }

    #[test]
    fn legacy_main_key_is_accepted() {
        let descriptor: ScriptDescriptor = serde_json::from_value(serde_json::json!({
            "code": "def start(i): return i",
            "main": "start"
        }))
        .unwrap();
        assert_eq!(descriptor.entry_point.as_deref(), Some("start"));
    }

    #[test]
    fn record_wire_shape() {
        let record = ScriptRecord {
            id: id("hello-world"),
            fields: ScriptFields {
                name: "Hello World".into(),
                description: "Simple test script".into(),
                author: "Hybrid Labs".into(),
                version: "1.0.0".into(),
                code: "def main(input): return input".into(),
                entry_point: "main".into(),
                packages: vec!["requests".into()],
            },
            installed_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_500,
        };

        insta::assert_json_snapshot!(record, @r#"
        {
          "id": "hello-world",
          "name": "Hello World",
          "description": "Simple test script",
          "author": "Hybrid Labs",
          "version": "1.0.0",
          "code": "def main(input): return input",
          "entryPoint": "main",
          "packages": [
            "requests"
          ],
          "installedAt": 1700000000000,
          "updatedAt": 1700000000500
        }
        "#);

        let back: ScriptRecord = serde_json::from_value(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(back, record);
    }
}
