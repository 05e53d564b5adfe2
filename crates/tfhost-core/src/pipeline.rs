//! State document to inventory
//!
//! ```text
//! modules → resources, outputs → Record::enrich → classify → InventoryState::merge
//! ```
//!
//! Records are processed module by module, resources before outputs, each in
//! document order. The first error ends the run.

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::classify::classify;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::merge::InventoryState;
use crate::record::{Record, RecordKind};
use crate::state::StateDocument;

/// Build the inventory for a whole state document
///
/// # Errors
/// Returns the first error from enrichment, classification or merging; no
/// partial inventory is returned.
#[instrument(skip_all)]
pub fn build_inventory(state: &StateDocument, config: &PipelineConfig) -> Result<InventoryState> {
    let mut inventory = InventoryState::new();

    for module in state.modules()? {
        debug!(path = ?module.path, "processing module");
        process_entries(
            &mut inventory,
            RecordKind::Resource,
            &module.path,
            &module.resources,
            config,
        )?;
        process_entries(
            &mut inventory,
            RecordKind::Output,
            &module.path,
            &module.outputs,
            config,
        )?;
    }

    info!(
        groups = inventory.groups.len(),
        hosts = inventory.hosts.len(),
        "inventory built"
    );
    Ok(inventory)
}

fn process_entries(
    inventory: &mut InventoryState,
    kind: RecordKind,
    module_path: &[String],
    entries: &Map<String, Value>,
    config: &PipelineConfig,
) -> Result<()> {
    let templates = config.templates(kind);

    for (name, entry) in entries {
        debug!(%kind, name = %name, "processing entry");
        let record = Record::enrich(kind, name.as_str(), module_path, entry)?;
        if let Some(partial) = classify(&record, templates)? {
            inventory.merge(partial)?;
        }
    }

    Ok(())
}
