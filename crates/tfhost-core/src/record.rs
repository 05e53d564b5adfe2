//! Enriched resource and output records

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use tfhost_flatmap::{Expanded, FlatMap, expand_all};

use crate::error::{InventoryError, Result};

/// Which part of a module a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Entry of `modules[].resources`
    Resource,
    /// Entry of `modules[].outputs`
    Output,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Resource => write!(f, "resource"),
            RecordKind::Output => write!(f, "output"),
        }
    }
}

/// A resource or output entry with its attributes expanded
///
/// Built once by [`Record::enrich`] and never modified afterwards. The
/// template context is derived at construction time.
#[derive(Debug, Clone)]
pub struct Record {
    kind: RecordKind,
    name: String,
    raw_attributes: FlatMap,
    expanded_attributes: BTreeMap<String, Expanded>,
    context: Value,
}

impl Record {
    /// Build a record from a raw state entry
    ///
    /// # Arguments
    /// * `kind` - Resource or output
    /// * `name` - Declared name of the entry
    /// * `module_path` - Path of the owning module
    /// * `entry` - Raw entry from the state document
    ///
    /// An output entry that is not an object is treated as `{"value": entry}`.
    ///
    /// # Errors
    /// Returns an error if a resource entry or its `primary.attributes` is not
    /// a JSON object.
    pub fn enrich(
        kind: RecordKind,
        name: impl Into<String>,
        module_path: &[String],
        entry: &Value,
    ) -> Result<Self> {
        let name = name.into();
        let legacy_output;
        let fields = match (entry, kind) {
            (Value::Object(fields), _) => fields,
            // v1/v2 state stores an output as its bare value
            (value, RecordKind::Output) => {
                legacy_output = Map::from_iter([("value".to_string(), value.clone())]);
                &legacy_output
            }
            (_, RecordKind::Resource) => {
                return Err(InventoryError::InvalidState(format!(
                    "{kind} '{name}' is not an object"
                )));
            }
        };

        let raw_attributes = primary_attributes(&name, fields)?;
        let expanded_attributes = expand_all(&raw_attributes);
        let context = build_context(
            fields,
            &name,
            module_path,
            &raw_attributes,
            &expanded_attributes,
        );

        Ok(Self {
            kind,
            name,
            raw_attributes,
            expanded_attributes,
            context,
        })
    }

    /// Resource or output
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Declared name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flat `primary.attributes` map (empty for outputs)
    #[must_use]
    pub fn raw_attributes(&self) -> &FlatMap {
        &self.raw_attributes
    }

    /// Expanded value per top-level attribute key
    #[must_use]
    pub fn expanded_attributes(&self) -> &BTreeMap<String, Expanded> {
        &self.expanded_attributes
    }

    /// Template context: the entry's fields plus `name`, `module_path` and
    /// `primary.{attributes, expanded_attributes}`
    #[must_use]
    pub fn context(&self) -> &Value {
        &self.context
    }
}

fn primary_attributes(name: &str, fields: &Map<String, Value>) -> Result<FlatMap> {
    let Some(attributes) = fields.get("primary").and_then(|p| p.get("attributes")) else {
        return Ok(FlatMap::new());
    };

    let attributes = attributes.as_object().ok_or_else(|| {
        InventoryError::InvalidState(format!("primary.attributes of '{name}' is not an object"))
    })?;

    Ok(attributes
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}

fn build_context(
    fields: &Map<String, Value>,
    name: &str,
    module_path: &[String],
    raw_attributes: &FlatMap,
    expanded_attributes: &BTreeMap<String, Expanded>,
) -> Value {
    let mut context = fields.clone();

    let mut primary = match context.remove("primary") {
        Some(Value::Object(primary)) => primary,
        _ => Map::new(),
    };
    primary.insert(
        "attributes".to_string(),
        Value::Object(
            raw_attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
    );
    primary.insert(
        "expanded_attributes".to_string(),
        Value::Object(
            expanded_attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().into()))
                .collect(),
        ),
    );

    context.insert("primary".to_string(), Value::Object(primary));
    context.insert("name".to_string(), Value::String(name.to_string()));
    context.insert(
        "module_path".to_string(),
        Value::Array(module_path.iter().cloned().map(Value::String).collect()),
    );

    Value::Object(context)
}
