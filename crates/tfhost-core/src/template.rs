//! Template compilation and rendering
//!
//! Templates are Jinja2 (via minijinja) with the settings the classic dynamic
//! inventory scripts used: trim/lstrip blocks, no auto-escaping. Undefined
//! variables are strict errors, booleans print as `True`/`False`, and
//! `default(other, true)` also replaces falsy values.

use std::fmt;

use minijinja::value::ValueKind;
use minijinja::{
    AutoEscape, Environment, Error, ErrorKind, Output, State, UndefinedBehavior, Value,
    escape_formatter,
};
use tracing::trace;

use crate::error::{InventoryError, Result};

/// A template compiled once and rendered per record
pub struct CompiledTemplate {
    /// Label used in diagnostics, e.g. `resource filter`
    label: String,
    /// Original source text
    source: String,
    /// Environment owning the compiled template
    env: Environment<'static>,
}

impl CompiledTemplate {
    /// Compile template source text
    ///
    /// # Arguments
    /// * `label` - Name used in diagnostics
    /// * `source` - Jinja2 source
    ///
    /// # Errors
    /// Returns [`InventoryError::TemplateSyntax`] if the source does not parse.
    pub fn compile(label: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let source = source.into();

        let mut env = environment();
        env.add_template_owned(label.clone(), source.clone())
            .map_err(|e| InventoryError::TemplateSyntax {
                template: label.clone(),
                message: e.to_string(),
                template_source: source.clone(),
            })?;

        Ok(Self { label, source, env })
    }

    /// Diagnostic label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source text the template was compiled from
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render the template against a record context
    ///
    /// # Errors
    /// Returns [`InventoryError::TemplateUndefined`] if the template references
    /// a variable missing from `context`, or [`InventoryError::TemplateRender`]
    /// for any other render failure.
    pub fn render(&self, record: &str, context: &serde_json::Value) -> Result<String> {
        let rendered = self
            .env
            .get_template(&self.label)
            .and_then(|template| template.render(context))
            .map_err(|e| self.render_error(record, &e))?;

        trace!(template = %self.label, record, rendered = %rendered, "rendered template");
        Ok(rendered)
    }

    fn render_error(&self, record: &str, error: &Error) -> InventoryError {
        let template = self.label.clone();
        let record = record.to_string();
        let message = error.to_string();
        match error.kind() {
            ErrorKind::UndefinedError => InventoryError::TemplateUndefined {
                template,
                record,
                message,
            },
            _ => InventoryError::TemplateRender {
                template,
                record,
                message,
            },
        }
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("label", &self.label)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_formatter(python_formatter);
    env.add_filter("default", default_filter);
    env.add_filter("d", default_filter);
    env
}

/// Print booleans the way Jinja2 does, everything else unchanged
fn python_formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> std::result::Result<(), Error> {
    if value.kind() == ValueKind::Bool {
        let text = if value.is_true() { "True" } else { "False" };
        return out
            .write_str(text)
            .map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write template output"));
    }
    escape_formatter(out, state, value)
}

/// Jinja2 `default(other, boolean=false)`
///
/// Falls back to `other` for undefined values, and for falsy values too when
/// `boolean` is set. A chain that runs out of fallbacks yields `""`.
fn default_filter(value: Option<Value>, other: Option<Value>, boolean: Option<bool>) -> Value {
    let lax = boolean.unwrap_or(false);
    match value {
        Some(value) if !value.is_undefined() && (!lax || value.is_true()) => value,
        _ => other
            .filter(|o| !o.is_undefined())
            .unwrap_or_else(|| Value::from("")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render(source: &str, context: &serde_json::Value) -> Result<String> {
        CompiledTemplate::compile("test", source)?.render("rec", context)
    }

    #[test]
    fn test_render_simple() {
        let out = render("{{ name }}", &json!({"name": "web"})).expect("render");
        assert_eq!(out, "web");
    }

    #[test]
    fn test_syntax_error() {
        let err = CompiledTemplate::compile("resource name", "{{ name").expect_err("syntax");
        match err {
            InventoryError::TemplateSyntax {
                template,
                template_source,
                ..
            } => {
                assert_eq!(template, "resource name");
                assert_eq!(template_source, "{{ name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_undefined_variable_is_strict() {
        let err = render("{{ missing }}", &json!({"name": "web"})).expect_err("undefined");
        match err {
            InventoryError::TemplateUndefined {
                template, record, ..
            } => {
                assert_eq!(template, "test");
                assert_eq!(record, "rec");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_undefined_attribute_of_undefined() {
        let err = render("{{ primary.attributes.id }}", &json!({})).expect_err("undefined");
        assert!(matches!(err, InventoryError::TemplateUndefined { .. }));
    }

    #[test]
    fn test_booleans_print_like_jinja2() {
        let context = json!({"type": "aws_instance"});
        assert_eq!(
            render(r#"{{ type in ["aws_instance"] }}"#, &context).expect("render"),
            "True"
        );
        assert_eq!(
            render(r#"{{ type in ["vsphere_virtual_machine"] }}"#, &context).expect("render"),
            "False"
        );
    }

    #[test]
    fn test_default_chain_skips_falsy_when_boolean() {
        let context = json!({"attrs": {"a": "", "c": "10.0.0.1"}});
        let out = render(
            "{{ attrs.a | default(attrs.b, true) | default(attrs.c, true) }}",
            &context,
        )
        .expect("render");
        assert_eq!(out, "10.0.0.1");
    }

    #[test]
    fn test_default_keeps_falsy_without_boolean() {
        let context = json!({"attrs": {"a": ""}});
        let out = render("[{{ attrs.a | default('x') }}]", &context).expect("render");
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_default_chain_exhausted_is_empty() {
        let out = render(
            "[{{ attrs.a | default(attrs.b, true) }}]",
            &json!({"attrs": {}}),
        )
        .expect("render");
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_dotted_key_lookup() {
        let context = json!({"attrs": {"network.0.floating_ip": "1.2.3.4"}});
        let out = render(r#"{{ attrs["network.0.floating_ip"] }}"#, &context).expect("render");
        assert_eq!(out, "1.2.3.4");
    }

    #[test]
    fn test_trim_blocks_and_no_escaping() {
        let context = json!({"items": ["<a>", "b&c"]});
        let source = "{% for item in items %}\n  {{ item }}\n{% endfor %}";
        let out = render(source, &context).expect("render");
        assert_eq!(out, "  <a>\n  b&c\n");
    }

    #[test]
    fn test_source_and_label_kept() {
        let template = CompiledTemplate::compile("output name", "{{ name }}").expect("compile");
        assert_eq!(template.label(), "output name");
        assert_eq!(template.source(), "{{ name }}");
    }
}
