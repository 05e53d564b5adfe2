//! Host variable parsing
//!
//! The host-vars template renders one `key=value` assignment per line. Values
//! starting with `[` or `{` are structured literals; everything else is kept
//! as a string.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{InventoryError, Result};
use crate::literal::parse_literal;

/// Variables attached to one inventory name
pub type HostVars = BTreeMap<String, Value>;

/// Parse rendered host-vars text
///
/// # Arguments
/// * `record` - Record name, for diagnostics
/// * `template_source` - Source of the template that produced `text`
/// * `text` - Rendered template output
///
/// # Errors
/// Returns [`InventoryError::HostVarLiteral`] if a value that starts with `[`
/// or `{` is not a valid literal. A line without `=` is not an error: it is
/// logged and its value set to `""`.
pub fn parse_host_vars(record: &str, template_source: &str, text: &str) -> Result<HostVars> {
    let mut vars = HostVars::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (key, value) = match line.split_once('=') {
            Some((key, raw)) => (key.trim(), parse_value(record, key.trim(), raw.trim())?),
            None => {
                warn!(
                    record,
                    assignment = line,
                    template = template_source,
                    "no '=' in host var assignment"
                );
                (line, Value::String(String::new()))
            }
        };

        debug!(record, key, value = %value, "host var set");
        vars.insert(key.to_string(), value);
    }

    Ok(vars)
}

fn parse_value(record: &str, key: &str, raw: &str) -> Result<Value> {
    if raw.starts_with('[') || raw.starts_with('{') {
        parse_literal(raw).map_err(|message| InventoryError::HostVarLiteral {
            record: record.to_string(),
            key: key.to_string(),
            message,
        })
    } else {
        Ok(Value::String(raw.to_string()))
    }
}
