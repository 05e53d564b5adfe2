//! Per-record classification
//!
//! Runs the filter, name, groups and host-vars templates against one record
//! and returns that record's partial contribution to the inventory.

use tracing::{debug, instrument};

use crate::config::{TemplateRole, TemplateSet};
use crate::error::{InventoryError, Result};
use crate::hostvars::parse_host_vars;
use crate::merge::Partial;
use crate::record::Record;

/// Classify one record
///
/// Returns `None` when the filter template renders `False`. Inventory name
/// uniqueness is not checked here; that happens when partials are merged.
///
/// # Errors
/// Returns an error if any template fails to render, if the filter renders
/// anything other than `True`/`False`, or if a host var literal is invalid.
#[instrument(skip_all, fields(kind = %record.kind(), record = %record.name()))]
pub fn classify(record: &Record, templates: &TemplateSet) -> Result<Option<Partial>> {
    let context = record.context();
    let render = |role: TemplateRole| templates.get(role).render(record.name(), context);

    let filter_value = render(TemplateRole::Filter)?;
    match filter_value.as_str() {
        "True" => {}
        "False" => {
            debug!("skipped by filter");
            return Ok(None);
        }
        _ => {
            let filter = templates.get(TemplateRole::Filter);
            return Err(InventoryError::FilterContract {
                template: filter.label().to_string(),
                record: record.name().to_string(),
                value: filter_value,
                template_source: filter.source().to_string(),
            });
        }
    }

    let inventory_name = render(TemplateRole::Name)?;
    debug!(inventory_name = %inventory_name, "rendered inventory name");

    let mut partial = Partial::empty();

    let groups_text = render(TemplateRole::Groups)?;
    for group in split_groups(&groups_text) {
        debug!(group, inventory_name = %inventory_name, "added to group");
        partial.add_to_group(group, inventory_name.as_str());
    }

    let host_vars_text = render(TemplateRole::HostVars)?;
    let host_vars = parse_host_vars(
        record.name(),
        templates.get(TemplateRole::HostVars).source(),
        &host_vars_text,
    )?;
    partial.add_host(inventory_name, host_vars);

    Ok(Some(partial))
}

/// Group names from rendered text, split on newlines and commas
fn split_groups(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|g| !g.is_empty())
}
