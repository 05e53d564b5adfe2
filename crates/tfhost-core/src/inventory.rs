//! Dynamic inventory responses
//!
//! Ansible calls an inventory script either with `--list` (all groups plus
//! every host's variables under `_meta`) or with `--host <name>` (one host's
//! variables).

use serde_json::{Map, Value, json};
use tracing::warn;

use crate::hostvars::HostVars;
use crate::merge::InventoryState;

/// Reserved list-mode key holding all host variables
pub const META_KEY: &str = "_meta";

/// What the caller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Full listing with `_meta.hostvars`
    List,
    /// Variables of one inventory name
    Host(String),
}

impl InventoryState {
    /// List-mode document: every group plus `_meta.hostvars`
    ///
    /// A group literally named `_meta` is shadowed by the meta entry.
    #[must_use]
    pub fn list(&self) -> Value {
        let mut doc = Map::new();
        for (name, group) in &self.groups {
            doc.insert(name.clone(), json!({ "hosts": group.hosts }));
        }

        if doc.contains_key(META_KEY) {
            warn!("group named '{META_KEY}' is shadowed by inventory metadata");
        }
        doc.insert(META_KEY.to_string(), json!({ "hostvars": self.hosts }));

        Value::Object(doc)
    }

    /// Host-mode document: the variables of `name`, or `{}` if unknown
    #[must_use]
    pub fn host(&self, name: &str) -> HostVars {
        self.hosts.get(name).cloned().unwrap_or_default()
    }

    /// Answer a query
    #[must_use]
    pub fn respond(&self, query: &Query) -> Value {
        match query {
            Query::List => self.list(),
            Query::Host(name) => Value::Object(self.host(name).into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::merge::Partial;

    fn inventory() -> InventoryState {
        let mut partial = Partial::empty();
        partial.add_to_group("all", "web");
        partial.add_to_group("frontend", "web");
        let mut vars = HostVars::new();
        vars.insert("host_name".to_string(), json!("1.2.3.4"));
        partial.add_host("web", vars);

        InventoryState::from_partials([partial]).expect("merge")
    }

    #[test]
    fn test_list_mode() {
        assert_eq!(
            inventory().respond(&Query::List),
            json!({
                "all": {"hosts": ["web"]},
                "frontend": {"hosts": ["web"]},
                "_meta": {"hostvars": {"web": {"host_name": "1.2.3.4"}}}
            })
        );
    }

    #[test]
    fn test_host_mode() {
        assert_eq!(
            inventory().respond(&Query::Host("web".to_string())),
            json!({"host_name": "1.2.3.4"})
        );
    }

    #[test]
    fn test_host_mode_unknown_is_empty() {
        assert_eq!(inventory().respond(&Query::Host("nope".to_string())), json!({}));
        assert!(inventory().host("nope").is_empty());
    }

    #[test]
    fn test_empty_inventory_lists_meta_only() {
        assert_eq!(
            InventoryState::new().list(),
            json!({"_meta": {"hostvars": {}}})
        );
    }

    #[test]
    fn test_meta_group_shadowed() {
        let mut partial = Partial::empty();
        partial.add_to_group(META_KEY, "web");
        partial.add_host("web", HostVars::new());
        let state = InventoryState::from_partials([partial]).expect("merge");

        assert_eq!(state.list()[META_KEY], json!({"hostvars": {"web": {}}}));
    }
}
