//! Resolution options
//!
//! Options can be built in code or read from a JSON configuration document.
//! Missing keys take their default value.

use serde::{Deserialize, Serialize};

use crate::schema::{SchemaError, SchemaResult};

/// Options for [`resolve`](super::resolve).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Display name of the root accessor type
    pub name: Option<String>,
    /// Build the default with lists instead of tuples and records
    pub listify_default: bool,
    /// Validate the schema before resolving it
    pub check: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            name: None,
            listify_default: false,
            check: true,
        }
    }
}

impl ResolveOptions {
    /// Default options with a root accessor name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_listify_default(mut self, listify_default: bool) -> Self {
        self.listify_default = listify_default;
        self
    }

    /// Skips validation. Only for schemas known to be valid.
    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    /// Parses options from a JSON document.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        serde_json::from_str(content).map_err(|e| {
            SchemaError::malformed_document("options", format!("Invalid resolve options: {}", e))
        })
    }
}
