#![forbid(unsafe_code)]

use kindex_core::{Document, Gvk};
use kindex_registry::{Outcome, Policy, Registry};

fn doc(v: serde_json::Value) -> Document { Document::from_json(&v).unwrap() }

fn dr() -> Document {
    doc(serde_json::json!({
        "name": "destinationrules",
        "singularName": "destinationrule",
        "kind": "DestinationRule",
        "group": "networking.istio.io",
        "version": "v1alpha3",
        "namespaced": true,
        "shortNames": ["dr"]
    }))
}

fn pods_missing_singular() -> Document {
    doc(serde_json::json!({
        "name": "pods",
        "kind": "Pod",
        "group": "",
        "version": "v1",
        "namespaced": true,
        "shortNames": ["po"],
        "verbs": ["get", "list", "watch"]
    }))
}

#[test]
fn registers_and_resolves_aliases() {
    let mut reg = Registry::new(Policy::Strict);
    let out = reg.register(&dr());
    let gvk = Gvk::new("networking.istio.io", "v1alpha3", "DestinationRule");
    assert_eq!(out, Outcome::Registered { gvk: gvk.clone(), errors: Default::default() });
    assert_eq!(reg.len(), 1);

    for alias in ["dr", "DR", "destinationrules", "destinationrule", "networking.istio.io/v1alpha3/DestinationRule"] {
        let m = reg.resolve(alias).unwrap_or_else(|| panic!("alias {} not resolved", alias));
        assert_eq!(m.kind, "DestinationRule");
    }
    assert!(reg.resolve("gw").is_none());
    assert_eq!(reg.aliases_of(&gvk), vec!["destinationrule", "destinationrules", "dr"]);
    assert!(reg.diagnostics().is_empty());
}

#[test]
fn strict_policy_skips_documents_with_errors() {
    let mut reg = Registry::new(Policy::Strict);
    let out = reg.register(&pods_missing_singular());
    assert!(!out.is_registered());
    assert_eq!(out.errors().fields(), vec!["singularName"]);
    assert!(reg.is_empty());
    assert!(reg.resolve("po").is_none());

    let diags = reg.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].gvk, "v1/Pod");
    assert!(!diags[0].registered);
}

#[test]
fn lenient_policy_keeps_partial_descriptor() {
    let mut reg = Registry::new(Policy::Lenient);
    let out = reg.register(&pods_missing_singular());
    assert!(out.is_registered());
    assert_eq!(out.errors().len(), 1);

    let m = reg.resolve("po").unwrap();
    assert_eq!(m.singular_name, "");
    assert_eq!(m.verbs, vec!["get", "list", "watch"]);
    assert_eq!(reg.get(&Gvk::new("", "v1", "Pod")), Some(m));
    assert!(reg.diagnostics()[0].registered);
}

#[test]
fn registries_are_independent() {
    let mut a = Registry::new(Policy::Lenient);
    let b = Registry::new(Policy::Lenient);
    a.register(&dr());
    assert_eq!(a.len(), 1);
    assert!(b.is_empty());
    assert!(b.resolve("dr").is_none());
}

#[test]
fn later_registration_rebinds_alias() {
    let mut reg = Registry::default();
    reg.register(&dr());
    let other = doc(serde_json::json!({
        "name": "drafts",
        "singularName": "draft",
        "kind": "Draft",
        "group": "example.com",
        "version": "v1",
        "namespaced": false,
        "shortNames": ["dr"]
    }));
    reg.register(&other);
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.resolve("dr").unwrap().kind, "Draft");
    assert_eq!(reg.resolve("destinationrules").unwrap().kind, "DestinationRule");

    let kinds: Vec<&str> = reg.list().iter().map(|m| m.kind.as_str()).collect();
    assert_eq!(kinds, vec!["Draft", "DestinationRule"]);
}

#[test]
fn register_all_from_discovery_list() {
    let list = serde_json::json!({
        "groupVersion": "apps/v1",
        "resources": [
            { "name": "deployments", "singularName": "deployment", "kind": "Deployment", "namespaced": true, "shortNames": ["deploy"], "verbs": ["get"] },
            { "name": "deployments/scale", "singularName": "", "kind": "Scale", "namespaced": true },
            { "name": "daemonsets", "kind": "DaemonSet", "namespaced": true, "shortNames": ["ds"] }
        ]
    });
    let docs = kindex_kubehub::documents_from_json(&list).unwrap();
    let mut reg = Registry::new(Policy::Strict);
    let outcomes = reg.register_all(&docs);
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_registered());
    assert!(!outcomes[1].is_registered());
    assert_eq!(reg.resolve("deploy").unwrap().group, "apps");
    assert!(reg.resolve("ds").is_none());
    assert_eq!(reg.diagnostics()[0].seq, 1);
}

#[test]
fn reregistering_a_kind_drops_its_old_aliases() {
    let mut reg = Registry::new(Policy::Strict);
    reg.register(&dr());
    let renamed = doc(serde_json::json!({
        "name": "destinationrules",
        "singularName": "destinationrule",
        "kind": "DestinationRule",
        "group": "networking.istio.io",
        "version": "v1alpha3",
        "namespaced": true,
        "shortNames": ["dst"]
    }));
    assert!(reg.register(&renamed).is_registered());

    assert!(reg.resolve("dr").is_none());
    assert_eq!(reg.resolve("dst").unwrap().short_names, vec!["dst"]);
    let gvk = Gvk::new("networking.istio.io", "v1alpha3", "DestinationRule");
    assert_eq!(reg.aliases_of(&gvk), vec!["destinationrule", "destinationrules", "dst"]);
    assert_eq!(reg.len(), 1);
}

#[test]
fn reregistering_keeps_aliases_of_other_kinds() {
    let mut reg = Registry::default();
    reg.register(&dr());
    reg.register(&pods_missing_singular());
    reg.register(&dr());
    assert_eq!(reg.resolve("po").unwrap().kind, "Pod");
    assert_eq!(reg.resolve("dr").unwrap().kind, "DestinationRule");
}

#[test]
fn lenient_does_not_index_documents_without_kind_or_version() {
    let mut reg = Registry::new(Policy::Lenient);
    let foos = reg.register(&doc(serde_json::json!({ "name": "foos" })));
    let bars = reg.register(&doc(serde_json::json!({ "name": "bars" })));
    assert!(!foos.is_registered());
    assert!(!bars.is_registered());
    assert_eq!(foos.errors().fields(), vec!["singularName", "kind", "group", "version", "namespaced"]);
    assert!(reg.is_empty());
    assert!(reg.resolve("foos").is_none());
    assert!(reg.resolve("bars").is_none());

    let diags = reg.diagnostics();
    assert_eq!(diags.len(), 2);
    assert!(diags.iter().all(|d| !d.registered));

    // Missing only the group still indexes under the core group.
    let out = reg.register(&doc(serde_json::json!({
        "name": "widgets", "singularName": "widget", "kind": "Widget", "version": "v1", "namespaced": false
    })));
    assert!(out.is_registered());
    assert_eq!(reg.resolve("widgets").unwrap().gvk().key(), "v1/Widget");
}

#[test]
fn take_diagnostics_drains() {
    let mut reg = Registry::new(Policy::Strict);
    reg.register(&pods_missing_singular());
    let taken = reg.take_diagnostics();
    assert_eq!(taken.len(), 1);
    assert_eq!(taken[0].errors.fields(), vec!["singularName"]);
    assert!(reg.diagnostics().is_empty());

    reg.register(&pods_missing_singular());
    assert_eq!(reg.diagnostics().len(), 1);
    assert_eq!(reg.diagnostics()[0].seq, 1);
}
