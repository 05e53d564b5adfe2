//! tfhost-core: Terraform state to Ansible dynamic inventory
//!
//! Every resource and output of a state document is enriched with its
//! expanded attributes, classified by four user-configurable templates
//! (filter, inventory name, groups, host vars) and merged into one
//! inventory. Inventory names must be unique across the whole document.

pub mod classify;
pub mod config;
pub mod error;
pub mod hostvars;
pub mod inventory;
pub mod literal;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod state;
pub mod template;

pub use classify::classify;
pub use config::{PipelineConfig, TemplateRole, TemplateSet, TemplateSources};
pub use error::InventoryError;
pub use hostvars::{HostVars, parse_host_vars};
pub use inventory::{META_KEY, Query};
pub use merge::{Group, InventoryState, Partial};
pub use pipeline::build_inventory;
pub use record::{Record, RecordKind};
pub use state::{Module, StateDocument};
pub use template::CompiledTemplate;
