//! Command-line arguments
//!
//! Every template flag can also be set through its environment variable;
//! clap resolves flag over environment before the config file is consulted.

use std::path::PathBuf;

use clap::{ArgGroup, Args as ClapArgs, Parser};
use tfhost_core::Query;

use crate::config::TemplateOverrides;

/// Ansible dynamic inventory from Terraform state
#[derive(Parser, Debug)]
#[command(name = "tfhost", version, about)]
#[command(group(ArgGroup::new("mode").args(["list", "host"]).multiple(false)))]
pub struct Args {
    /// List all groups and host variables
    #[arg(long)]
    pub list: bool,

    /// Print the variables of one inventory host
    #[arg(long, value_name = "INVENTORY_NAME")]
    pub host: Option<String>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Terraform state file, `-` for stdin
    #[arg(long, env = "TF_STATE", default_value = "terraform.tfstate")]
    pub state: PathBuf,

    /// Config file path
    #[arg(long, env = "TFHOST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub resource: ResourceTemplateArgs,

    #[command(flatten)]
    pub output: OutputTemplateArgs,
}

impl Args {
    /// The requested inventory query, if any
    #[must_use]
    pub fn query(&self) -> Option<Query> {
        match (&self.host, self.list) {
            (Some(host), _) => Some(Query::Host(host.clone())),
            (None, true) => Some(Query::List),
            (None, false) => None,
        }
    }
}

/// Templates applied to state resources
#[derive(ClapArgs, Debug, Default)]
pub struct ResourceTemplateArgs {
    /// Decides which resources become hosts (renders True or False)
    #[arg(
        id = "resource_filter",
        long = "ansible-resource-filter-template",
        env = "TF_ANSIBLE_RESOURCE_FILTER_TEMPLATE"
    )]
    pub filter: Option<String>,

    /// Renders the inventory name of a resource
    #[arg(
        id = "resource_name",
        long = "ansible-inventory-name-template",
        env = "TF_ANSIBLE_INVENTORY_NAME_TEMPLATE"
    )]
    pub name: Option<String>,

    /// Renders group names, separated by newlines or commas
    #[arg(
        id = "resource_groups",
        long = "ansible-groups-template",
        env = "TF_ANSIBLE_GROUPS_TEMPLATE"
    )]
    pub groups: Option<String>,

    /// Renders key=value host variable lines
    #[arg(
        id = "resource_host_vars",
        long = "ansible-host-vars-template",
        env = "TF_ANSIBLE_HOST_VARS_TEMPLATE"
    )]
    pub host_vars: Option<String>,
}

/// Templates applied to state outputs
#[derive(ClapArgs, Debug, Default)]
pub struct OutputTemplateArgs {
    /// Decides which outputs become hosts (renders True or False)
    #[arg(
        id = "output_filter",
        long = "ansible-output-filter-template",
        env = "TF_ANSIBLE_OUTPUT_FILTER_TEMPLATE"
    )]
    pub filter: Option<String>,

    /// Renders the inventory name of an output
    #[arg(
        id = "output_name",
        long = "ansible-output-inventory-name-template",
        env = "TF_ANSIBLE_OUTPUT_INVENTORY_NAME_TEMPLATE"
    )]
    pub name: Option<String>,

    /// Renders group names, separated by newlines or commas
    #[arg(
        id = "output_groups",
        long = "ansible-output-groups-template",
        env = "TF_ANSIBLE_OUTPUT_GROUPS_TEMPLATE"
    )]
    pub groups: Option<String>,

    /// Renders key=value host variable lines
    #[arg(
        id = "output_host_vars",
        long = "ansible-output-host-vars-template",
        env = "TF_ANSIBLE_OUTPUT_HOST_VARS_TEMPLATE"
    )]
    pub host_vars: Option<String>,
}

impl From<&ResourceTemplateArgs> for TemplateOverrides {
    fn from(args: &ResourceTemplateArgs) -> Self {
        Self {
            filter: args.filter.clone(),
            name: args.name.clone(),
            groups: args.groups.clone(),
            host_vars: args.host_vars.clone(),
        }
    }
}

impl From<&OutputTemplateArgs> for TemplateOverrides {
    fn from(args: &OutputTemplateArgs) -> Self {
        Self {
            filter: args.filter.clone(),
            name: args.name.clone(),
            groups: args.groups.clone(),
            host_vars: args.host_vars.clone(),
        }
    }
}
