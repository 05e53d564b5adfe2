//! Template configuration for the inventory pipeline
//!
//! [`TemplateSources`] holds the four template texts for one record kind;
//! [`PipelineConfig`] holds both kinds compiled. Both are built once at
//! startup and passed down by reference.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::RecordKind;
use crate::template::CompiledTemplate;

/// Default inventory name: the record's declared name
pub const DEFAULT_NAME_TEMPLATE: &str = "{{ name }}";

/// Default groups: everything in `all`
pub const DEFAULT_GROUPS_TEMPLATE: &str = "all";

/// Default resource filter: compute instances of known providers
pub const DEFAULT_RESOURCE_FILTER_TEMPLATE: &str = r#"{{ type in [
    "alicloud_instance",
    "aws_instance",
    "clc_server",
    "cloudstack_instance",
    "digitalocean_droplet",
    "docker_container",
    "google_compute_instance",
    "azurem_virtual_machine",
    "azurerm_virtual_machine",
    "azure_instance",
    "openstack_compute_instance_v2",
    "profitbricks_server",
    "scaleway_server",
    "softlayer_virtual_guest",
    "triton_machine",
    "vsphere_virtual_machine"] }}"#;

/// Default output filter: no outputs
pub const DEFAULT_OUTPUT_FILTER_TEMPLATE: &str = "False";

/// Default host vars: `host_name` from the first address found, then every
/// expanded attribute as `tf_<key>`
///
/// Address preference is IPv6 before IPv4 and public before private, across
/// the attribute names the supported providers use.
pub const DEFAULT_HOST_VARS_TEMPLATE: &str = r#"host_name={{ primary.attributes.access_ip_v6
    | default(primary.attributes.ipv6_address, true)
    | default(primary.attributes.access_ip_v4, true)
    | default(primary.attributes["network.0.floating_ip"], true)
    | default(primary.attributes["network.0.access_ip_v6"], true)
    | default(primary.attributes["network.0.access_ip_v4"], true)
    | default(primary.attributes["network_interface.0.access_config.0.assigned_nat_ip"], true)
    | default(primary.attributes.ipv4_address, true)
    | default(primary.attributes.public_ip, true)
    | default(primary.attributes.ipaddress, true)
    | default(primary.attributes.vip_address, true)
    | default(primary.attributes.primaryip, true)
    | default(primary.attributes.ip_address, true)
    | default(primary.attributes["network_interface.0.ipv6_address"], true)
    | default(primary.attributes.ipv6_address_private, true)
    | default(primary.attributes.private_ip, true)
    | default(primary.attributes["network_interface.0.ipv4_address"], true)
    | default(primary.attributes.private_ip_address, true)
    | default(primary.attributes.ipv4_address_private, true)
    | default(primary.attributes["network_interface.0.address"], true)
    | default(primary.attributes["network.0.fixed_ip_v6"], true)
    | default(primary.attributes["network.0.fixed_ip_v4"], true) }}
{% for attr, value in primary.expanded_attributes | dictsort %}
tf_{{ attr }}={{ value }}
{% endfor %}
"#;

/// The four template roles applied to every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRole {
    /// Decides inclusion (`True` / `False`)
    Filter,
    /// Renders the inventory name
    Name,
    /// Renders group names
    Groups,
    /// Renders `key=value` host variable lines
    HostVars,
}

impl std::fmt::Display for TemplateRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateRole::Filter => write!(f, "filter"),
            TemplateRole::Name => write!(f, "inventory name"),
            TemplateRole::Groups => write!(f, "groups"),
            TemplateRole::HostVars => write!(f, "host vars"),
        }
    }
}

/// Template source texts for one record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSources {
    /// Filter template
    pub filter: String,
    /// Inventory name template
    pub name: String,
    /// Groups template
    pub groups: String,
    /// Host vars template
    pub host_vars: String,
}

impl TemplateSources {
    /// Built-in defaults for a record kind
    #[must_use]
    pub fn defaults(kind: RecordKind) -> Self {
        let filter = match kind {
            RecordKind::Resource => DEFAULT_RESOURCE_FILTER_TEMPLATE,
            RecordKind::Output => DEFAULT_OUTPUT_FILTER_TEMPLATE,
        };
        Self {
            filter: filter.to_string(),
            name: DEFAULT_NAME_TEMPLATE.to_string(),
            groups: DEFAULT_GROUPS_TEMPLATE.to_string(),
            host_vars: DEFAULT_HOST_VARS_TEMPLATE.to_string(),
        }
    }

    /// Replace the filter template
    #[must_use]
    pub fn with_filter(mut self, source: impl Into<String>) -> Self {
        self.filter = source.into();
        self
    }

    /// Replace the inventory name template
    #[must_use]
    pub fn with_name(mut self, source: impl Into<String>) -> Self {
        self.name = source.into();
        self
    }

    /// Replace the groups template
    #[must_use]
    pub fn with_groups(mut self, source: impl Into<String>) -> Self {
        self.groups = source.into();
        self
    }

    /// Replace the host vars template
    #[must_use]
    pub fn with_host_vars(mut self, source: impl Into<String>) -> Self {
        self.host_vars = source.into();
        self
    }
}

/// Compiled templates for one record kind
#[derive(Debug)]
pub struct TemplateSet {
    kind: RecordKind,
    filter: CompiledTemplate,
    name: CompiledTemplate,
    groups: CompiledTemplate,
    host_vars: CompiledTemplate,
}

impl TemplateSet {
    /// Compile all four templates of a record kind
    ///
    /// # Errors
    /// Returns the first template syntax error encountered.
    pub fn compile(kind: RecordKind, sources: &TemplateSources) -> Result<Self> {
        let compile = |role: TemplateRole, source: &str| {
            CompiledTemplate::compile(format!("{kind} {role}"), source)
        };

        Ok(Self {
            kind,
            filter: compile(TemplateRole::Filter, &sources.filter)?,
            name: compile(TemplateRole::Name, &sources.name)?,
            groups: compile(TemplateRole::Groups, &sources.groups)?,
            host_vars: compile(TemplateRole::HostVars, &sources.host_vars)?,
        })
    }

    /// Record kind these templates apply to
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Template for a role
    #[must_use]
    pub fn get(&self, role: TemplateRole) -> &CompiledTemplate {
        match role {
            TemplateRole::Filter => &self.filter,
            TemplateRole::Name => &self.name,
            TemplateRole::Groups => &self.groups,
            TemplateRole::HostVars => &self.host_vars,
        }
    }
}

/// Everything the pipeline needs, compiled
#[derive(Debug)]
pub struct PipelineConfig {
    /// Templates applied to resources
    pub resources: TemplateSet,
    /// Templates applied to outputs
    pub outputs: TemplateSet,
}

impl PipelineConfig {
    /// Compile resource and output template sources
    ///
    /// # Errors
    /// Returns the first template syntax error encountered.
    pub fn compile(resources: &TemplateSources, outputs: &TemplateSources) -> Result<Self> {
        Ok(Self {
            resources: TemplateSet::compile(RecordKind::Resource, resources)?,
            outputs: TemplateSet::compile(RecordKind::Output, outputs)?,
        })
    }

    /// Compile the built-in defaults
    ///
    /// # Errors
    /// Returns an error only if a built-in template fails to compile.
    pub fn defaults() -> Result<Self> {
        Self::compile(
            &TemplateSources::defaults(RecordKind::Resource),
            &TemplateSources::defaults(RecordKind::Output),
        )
    }

    /// Templates for a record kind
    #[must_use]
    pub fn templates(&self, kind: RecordKind) -> &TemplateSet {
        match kind {
            RecordKind::Resource => &self.resources,
            RecordKind::Output => &self.outputs,
        }
    }
}
