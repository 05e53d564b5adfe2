use pretty_assertions::assert_eq;
use serde_json::json;

use tfhost_core::*;

fn state(doc: serde_json::Value) -> StateDocument {
    StateDocument::from_json(&doc.to_string()).expect("valid state")
}

fn compute(name_attrs: serde_json::Value) -> serde_json::Value {
    json!({
        "type": "openstack_compute_instance_v2",
        "depends_on": [],
        "primary": {"id": "x", "attributes": name_attrs, "meta": {}, "tainted": false},
        "deposed": [],
        "provider": "provider.openstack"
    })
}

#[test]
fn default_templates_end_to_end() {
    let doc = state(json!({
        "version": 3,
        "modules": [{
            "path": ["root"],
            "outputs": {},
            "resources": {
                "web": compute(json!({"id": "i-1", "network.0.access_ip_v4": "1.2.3.4"})),
                "sg": {
                    "type": "openstack_networking_secgroup_v2",
                    "primary": {"id": "sg-1", "attributes": {"id": "sg-1"}}
                }
            },
            "depends_on": []
        }]
    }));

    let config = PipelineConfig::defaults().expect("defaults");
    let inventory = build_inventory(&doc, &config).expect("inventory");
    let listing = inventory.respond(&Query::List);

    assert_eq!(listing["all"], json!({"hosts": ["web"]}));
    let web = &listing["_meta"]["hostvars"]["web"];
    assert_eq!(web["tf_id"], json!("i-1"));
    assert_eq!(web["host_name"], json!("1.2.3.4"));
    assert_eq!(web["tf_network"], json!({"0": {"access_ip_v4": "1.2.3.4"}}));
    assert!(listing["_meta"]["hostvars"].get("sg").is_none());
}

#[test]
fn duplicate_name_across_modules_aborts() {
    let doc = state(json!({
        "modules": [
            {"path": ["root"], "resources": {"web1": compute(json!({"id": "a"}))}},
            {"path": ["root", "child"], "resources": {"web1": compute(json!({"id": "b"}))}}
        ]
    }));

    let config = PipelineConfig::defaults().expect("defaults");
    let err = build_inventory(&doc, &config).expect_err("duplicate");
    assert_eq!(err, InventoryError::DuplicateInventoryName("web1".to_string()));
}

#[test]
fn duplicate_name_between_resource_and_output_aborts() {
    let doc = state(json!({
        "modules": [{
            "path": ["root"],
            "resources": {"web1": compute(json!({"id": "a"}))},
            "outputs": {"web1": {"sensitive": false, "type": "string", "value": "10.0.0.1"}}
        }]
    }));

    let outputs = TemplateSources::defaults(RecordKind::Output)
        .with_filter("True")
        .with_host_vars("host_name={{ value }}");
    let config = PipelineConfig::compile(&TemplateSources::defaults(RecordKind::Resource), &outputs)
        .expect("compile");

    let err = build_inventory(&doc, &config).expect_err("duplicate");
    assert!(matches!(err, InventoryError::DuplicateInventoryName(name) if name == "web1"));
}

#[test]
fn outputs_included_when_filter_allows() {
    let doc = state(json!({
        "modules": [{
            "path": ["root"],
            "resources": {},
            "outputs": {
                "bastion": {"sensitive": false, "type": "string", "value": "10.0.0.9"},
                "ignored": {"sensitive": true, "type": "string", "value": "secret"}
            }
        }]
    }));

    let outputs = TemplateSources::defaults(RecordKind::Output)
        .with_filter("{{ not sensitive }}")
        .with_groups("outputs")
        .with_host_vars("host_name={{ value }}");
    let config = PipelineConfig::compile(&TemplateSources::defaults(RecordKind::Resource), &outputs)
        .expect("compile");

    let inventory = build_inventory(&doc, &config).expect("inventory");

    assert_eq!(
        inventory.respond(&Query::List),
        json!({
            "outputs": {"hosts": ["bastion"]},
            "_meta": {"hostvars": {"bastion": {"host_name": "10.0.0.9"}}}
        })
    );
}

#[test]
fn outputs_excluded_by_default() {
    let doc = state(json!({
        "modules": [{
            "path": ["root"],
            "outputs": {"ip": {"sensitive": false, "type": "string", "value": "10.0.0.9"}}
        }]
    }));

    let config = PipelineConfig::defaults().expect("defaults");
    let inventory = build_inventory(&doc, &config).expect("inventory");

    assert!(inventory.hosts.is_empty());
    assert!(inventory.groups.is_empty());
}

#[test]
fn group_order_follows_document_order() {
    let doc = state(json!({
        "modules": [
            {"path": ["root"], "resources": {
                "zeta": compute(json!({"id": "z"})),
                "alpha": compute(json!({"id": "a"}))
            }},
            {"path": ["root", "db"], "resources": {
                "mid": compute(json!({"id": "m"}))
            }}
        ]
    }));

    let resources = TemplateSources::defaults(RecordKind::Resource)
        .with_name("{{ module_path | join('.') }}.{{ name }}");
    let config =
        PipelineConfig::compile(&resources, &TemplateSources::defaults(RecordKind::Output))
            .expect("compile");

    let inventory = build_inventory(&doc, &config).expect("inventory");
    assert_eq!(
        inventory.groups["all"].hosts,
        vec!["root.zeta", "root.alpha", "root.db.mid"]
    );
}

#[test]
fn host_mode_for_unknown_name_is_empty() {
    let doc = state(json!({"modules": [{"path": ["root"], "resources": {}}]}));

    let config = PipelineConfig::defaults().expect("defaults");
    let inventory = build_inventory(&doc, &config).expect("inventory");

    assert_eq!(inventory.respond(&Query::Host("web1".to_string())), json!({}));
}

#[test]
fn malformed_filter_result_aborts() {
    let doc = state(json!({
        "modules": [{"path": ["root"], "resources": {"web": compute(json!({"id": "a"}))}}]
    }));

    let resources = TemplateSources::defaults(RecordKind::Resource).with_filter("{{ type }}");
    let config =
        PipelineConfig::compile(&resources, &TemplateSources::defaults(RecordKind::Output))
            .expect("compile");

    let err = build_inventory(&doc, &config).expect_err("filter contract");
    assert!(matches!(err, InventoryError::FilterContract { .. }));
    assert!(err.is_template_error());
}

#[test]
fn structured_host_vars_from_expanded_attributes() {
    let doc = state(json!({
        "modules": [{"path": ["root"], "resources": {
            "web": compute(json!({
                "id": "i-1",
                "access_ip_v4": "10.1.1.1",
                "security_groups.#": "2",
                "security_groups.0": "default",
                "security_groups.1": "ssh",
                "metadata.%": "1",
                "metadata.role": "frontend"
            }))
        }}]
    }));

    let config = PipelineConfig::defaults().expect("defaults");
    let inventory = build_inventory(&doc, &config).expect("inventory");
    let vars = inventory.host("web");

    assert_eq!(vars["host_name"], json!("10.1.1.1"));
    assert_eq!(vars["tf_security_groups"], json!(["default", "ssh"]));
    assert_eq!(vars["tf_metadata"], json!({"role": "frontend"}));
}

#[test]
fn legacy_string_outputs_do_not_abort() {
    let doc = state(json!({
        "version": 1,
        "modules": [{
            "path": ["root"],
            "outputs": {"ip": "10.0.0.9"},
            "resources": {"web": compute(json!({"id": "i-1", "access_ip_v4": "10.0.0.9"}))}
        }]
    }));

    let config = PipelineConfig::defaults().expect("defaults");
    let inventory = build_inventory(&doc, &config).expect("inventory");
    assert_eq!(inventory.groups["all"].hosts, vec!["web"]);

    let outputs = TemplateSources::defaults(RecordKind::Output)
        .with_filter("True")
        .with_name("out-{{ name }}")
        .with_host_vars("host_name={{ value }}");
    let config = PipelineConfig::compile(&TemplateSources::defaults(RecordKind::Resource), &outputs)
        .expect("compile");
    let inventory = build_inventory(&doc, &config).expect("inventory");
    assert_eq!(inventory.host("out-ip")["host_name"], json!("10.0.0.9"));
}
