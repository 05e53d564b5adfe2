//! Terraform state document types
//!
//! Only the parts the inventory pipeline reads are typed. Resource and output
//! entries stay as raw JSON because templates may reference any of their
//! fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{InventoryError, Result};

/// A Terraform state document (formats v1 to v3)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDocument {
    /// State format version
    #[serde(default)]
    pub version: Option<u64>,
    /// Terraform version that wrote the state
    #[serde(default)]
    pub terraform_version: Option<String>,
    /// Module list; absent in v4+ documents
    #[serde(default)]
    pub modules: Option<Vec<Module>>,
}

impl StateDocument {
    /// Parse a state document from JSON text
    ///
    /// # Errors
    /// Returns an error if the text is not a JSON state document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| InventoryError::InvalidState(e.to_string()))
    }

    /// Modules in document order
    ///
    /// # Errors
    /// Returns an error if the document has no `modules` list, which is the
    /// case for newer state formats.
    pub fn modules(&self) -> Result<&[Module]> {
        self.modules.as_deref().ok_or_else(|| {
            let version = self
                .version
                .map_or_else(|| "unknown".to_string(), |v| v.to_string());
            InventoryError::InvalidState(format!(
                "no 'modules' list (state version {version}); only flat-attribute states (v1-v3) are supported"
            ))
        })
    }
}

/// One module of a state document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    /// Module path, e.g. `["root", "web"]`
    #[serde(default)]
    pub path: Vec<String>,
    /// Resources by name, in document order
    #[serde(default)]
    pub resources: Map<String, Value>,
    /// Outputs by name, in document order
    #[serde(default)]
    pub outputs: Map<String, Value>,
    /// Module dependencies
    #[serde(default)]
    pub depends_on: Vec<String>,
}
