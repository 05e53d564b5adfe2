//! Partial results and their merge into one inventory

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InventoryError, Result};
use crate::hostvars::HostVars;

/// Only field a partial group may carry
pub const HOSTS_FIELD: &str = "hosts";

/// Fields of a group inside a partial result, keyed by field name
pub type GroupFields = BTreeMap<String, Vec<String>>;

/// One record's contribution to the inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partial {
    /// Group name to group fields
    pub groups: BTreeMap<String, GroupFields>,
    /// Inventory name to host variables
    pub hosts: BTreeMap<String, HostVars>,
}

impl Partial {
    /// Partial contributing nothing
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the partial contributes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.hosts.is_empty()
    }

    /// Append a host to a group, creating the group if needed
    pub fn add_to_group(&mut self, group: impl Into<String>, host: impl Into<String>) {
        self.groups
            .entry(group.into())
            .or_default()
            .entry(HOSTS_FIELD.to_string())
            .or_default()
            .push(host.into());
    }

    /// Register host variables for an inventory name
    pub fn add_host(&mut self, name: impl Into<String>, vars: HostVars) {
        self.hosts.insert(name.into(), vars);
    }
}

/// A group in the merged inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Member inventory names in arrival order
    pub hosts: Vec<String>,
}

/// The merged inventory of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    /// Groups by name
    pub groups: BTreeMap<String, Group>,
    /// Host variables by inventory name
    pub hosts: BTreeMap<String, HostVars>,
}

impl InventoryState {
    /// Create an empty inventory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one partial result
    ///
    /// The partial is validated in full before anything is applied, so a
    /// failed merge leaves the inventory unchanged.
    ///
    /// # Errors
    /// Returns [`InventoryError::DuplicateInventoryName`] if a host is already
    /// registered, or [`InventoryError::UnsupportedMergeKey`] if a group
    /// carries a field other than `hosts`.
    pub fn merge(&mut self, partial: Partial) -> Result<()> {
        if let Some(name) = partial.hosts.keys().find(|n| self.hosts.contains_key(*n)) {
            return Err(InventoryError::DuplicateInventoryName(name.clone()));
        }
        for (group, fields) in &partial.groups {
            if let Some(key) = fields.keys().find(|k| *k != HOSTS_FIELD) {
                return Err(InventoryError::UnsupportedMergeKey {
                    group: group.clone(),
                    key: key.clone(),
                });
            }
        }

        for (name, fields) in partial.groups {
            let group = self.groups.entry(name).or_default();
            for (_, hosts) in fields {
                group.hosts.extend(hosts);
            }
        }
        for (name, vars) in partial.hosts {
            debug!(host = %name, vars = vars.len(), "host registered");
            self.hosts.insert(name, vars);
        }

        Ok(())
    }

    /// Fold partials into a fresh inventory, in order
    ///
    /// # Errors
    /// Returns the first merge error encountered.
    pub fn from_partials(partials: impl IntoIterator<Item = Partial>) -> Result<Self> {
        let mut state = Self::new();
        for partial in partials {
            state.merge(partial)?;
        }
        Ok(state)
    }
}
