//! Error types for tfhost-core

use thiserror::Error;

/// Errors that abort an inventory run
///
/// None of these are recoverable: the run produces no output once one occurs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Template source failed to compile
    #[error("syntax error in {template} template: {message} (template source was '{template_source}')")]
    TemplateSyntax {
        /// Template label, e.g. `resource groups`
        template: String,
        /// Engine diagnostic
        message: String,
        /// Offending source text
        template_source: String,
    },

    /// Template referenced a variable missing from the record context
    #[error("undefined variable in {template} template while rendering '{record}': {message}")]
    TemplateUndefined {
        /// Template label
        template: String,
        /// Record being rendered
        record: String,
        /// Engine diagnostic
        message: String,
    },

    /// Template failed to render for any other reason
    #[error("failed to render {template} template for '{record}': {message}")]
    TemplateRender {
        /// Template label
        template: String,
        /// Record being rendered
        record: String,
        /// Engine diagnostic
        message: String,
    },

    /// Filter template rendered something other than `True` or `False`
    #[error(
        "unexpected value returned from {template} template for '{record}': '{value}' (template was [{template_source}])"
    )]
    FilterContract {
        /// Template label
        template: String,
        /// Record being rendered
        record: String,
        /// Rendered text
        value: String,
        /// Filter template source
        template_source: String,
    },

    /// Two records rendered the same inventory name
    #[error("inventory name was not unique across terraform resources and outputs: '{0}' was a duplicate")]
    DuplicateInventoryName(String),

    /// Partial group carried a field other than `hosts`
    #[error("unsupported merge key '{key}' in group '{group}'")]
    UnsupportedMergeKey {
        /// Group name
        group: String,
        /// Offending field
        key: String,
    },

    /// Host variable value looked structured but did not parse
    #[error("invalid literal for host var '{key}' of '{record}': {message}")]
    HostVarLiteral {
        /// Record being rendered
        record: String,
        /// Host variable name
        key: String,
        /// Parser diagnostic
        message: String,
    },

    /// Input document is structurally unusable
    #[error("invalid state document: {0}")]
    InvalidState(String),
}

impl InventoryError {
    /// Check if the error stems from a user-supplied template
    #[must_use]
    pub fn is_template_error(&self) -> bool {
        matches!(
            self,
            InventoryError::TemplateSyntax { .. }
                | InventoryError::TemplateUndefined { .. }
                | InventoryError::TemplateRender { .. }
                | InventoryError::FilterContract { .. }
        )
    }
}

/// Result alias for tfhost-core operations
pub type Result<T> = std::result::Result<T, InventoryError>;
