//! Configuration loading and types
//!
//! Template sources are layered per setting: command line (or environment),
//! then the config file, then the built-in defaults.

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use tfhost_core::{PipelineConfig, RecordKind, TemplateSources};

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub log_level: Option<String>,
    /// Log line format on stderr
    #[serde(default)]
    pub log_format: LogFormat,
    /// Template overrides per record kind
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// `[templates.resource]` and `[templates.output]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub resource: TemplateOverrides,
    #[serde(default)]
    pub output: TemplateOverrides,
}

/// Optional replacements for the four templates of one record kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOverrides {
    pub filter: Option<String>,
    pub name: Option<String>,
    pub groups: Option<String>,
    pub host_vars: Option<String>,
}

impl TemplateOverrides {
    /// Replace every template in `sources` that this layer sets
    #[must_use]
    pub fn apply(&self, mut sources: TemplateSources) -> TemplateSources {
        if let Some(filter) = &self.filter {
            sources = sources.with_filter(filter.as_str());
        }
        if let Some(name) = &self.name {
            sources = sources.with_name(name.as_str());
        }
        if let Some(groups) = &self.groups {
            sources = sources.with_groups(groups.as_str());
        }
        if let Some(host_vars) = &self.host_vars {
            sources = sources.with_host_vars(host_vars.as_str());
        }
        sources
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Find the config file to use
    ///
    /// An explicit path always wins, even if it does not exist, so that a
    /// typo is reported instead of silently ignored.
    #[must_use]
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from("tfhost.toml");
        let user = dirs::config_dir().map(|p| p.join("tfhost/tfhost.toml"));

        std::iter::once(local)
            .chain(user)
            .find(|path| path.exists())
    }

    /// Load from the located path or use defaults
    ///
    /// # Errors
    /// Returns error if a located file cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        match Self::locate(explicit) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Config::default(), None)),
        }
    }

    /// Resolve and compile the templates for both record kinds
    ///
    /// `resource` and `output` are the command-line layer and take precedence
    /// over this file's `[templates]` tables.
    ///
    /// # Errors
    /// Returns error if any resolved template fails to compile
    pub fn pipeline(
        &self,
        resource: &TemplateOverrides,
        output: &TemplateOverrides,
    ) -> tfhost_core::error::Result<PipelineConfig> {
        let resources = self.sources(RecordKind::Resource, resource);
        let outputs = self.sources(RecordKind::Output, output);
        PipelineConfig::compile(&resources, &outputs)
    }

    /// Template sources for one kind after layering
    #[must_use]
    pub fn sources(&self, kind: RecordKind, cli: &TemplateOverrides) -> TemplateSources {
        let file = match kind {
            RecordKind::Resource => &self.templates.resource,
            RecordKind::Output => &self.templates.output,
        };
        cli.apply(file.apply(TemplateSources::defaults(kind)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tfhost_core::TemplateRole;

    use super::*;

    const SAMPLE: &str = r#"
log_level = "debug"
log_format = "json"

[templates.resource]
groups = "{{ type }}"
name = "tf-{{ name }}"

[templates.output]
filter = "True"
"#;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(SAMPLE).expect("parse");

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.templates.resource.groups.as_deref(), Some("{{ type }}"));
        assert_eq!(config.templates.output.filter.as_deref(), Some("True"));
        assert_eq!(config.templates.output.host_vars, None);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").expect("parse");

        assert_eq!(config.log_level, None);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.templates.resource, TemplateOverrides::default());
    }

    #[test]
    fn test_precedence_cli_over_file_over_default() {
        let config: Config = toml::from_str(SAMPLE).expect("parse");
        let cli = TemplateOverrides {
            name: Some("{{ primary.id }}".to_string()),
            ..TemplateOverrides::default()
        };

        let sources = config.sources(RecordKind::Resource, &cli);

        assert_eq!(sources.name, "{{ primary.id }}");
        assert_eq!(sources.groups, "{{ type }}");
        assert_eq!(
            sources.filter,
            TemplateSources::defaults(RecordKind::Resource).filter
        );
    }

    #[test]
    fn test_pipeline_compiles_layered_templates() {
        let config: Config = toml::from_str(SAMPLE).expect("parse");

        let pipeline = config
            .pipeline(&TemplateOverrides::default(), &TemplateOverrides::default())
            .expect("compile");

        assert_eq!(pipeline.outputs.get(TemplateRole::Filter).source(), "True");
        assert_eq!(pipeline.resources.get(TemplateRole::Name).source(), "tf-{{ name }}");
    }

    #[test]
    fn test_pipeline_reports_bad_template() {
        let cli = TemplateOverrides {
            groups: Some("{% for %}".to_string()),
            ..TemplateOverrides::default()
        };

        let err = Config::default()
            .pipeline(&TemplateOverrides::default(), &cli)
            .expect_err("syntax error");
        assert!(err.is_template_error());
        assert!(err.to_string().contains("output groups"));
    }

    #[test]
    fn test_locate_explicit_path_wins() {
        let path = Path::new("/nonexistent/tfhost.toml");
        assert_eq!(Config::locate(Some(path)), Some(path.to_path_buf()));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        assert!(Config::load_default(Some(Path::new("/nonexistent/tfhost.toml"))).is_err());
    }
}
