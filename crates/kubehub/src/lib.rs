//! Kindex kubehub – turn Kubernetes discovery payloads into documents.
//!
//! Discovery responses (`APIResourceList`) usually leave `group`/`version`
//! empty on each resource and state them once as `groupVersion`. The
//! adapters here push those down so every resource becomes a standalone
//! document the core extractor can read.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kindex_core::Document;
use tracing::{debug, warn};

/// Split `apps/v1` into `("apps", "v1")`; `v1` is the core group.
pub fn split_group_version(gv: &str) -> (&str, &str) {
    if let Some((g, v)) = gv.split_once('/') { (g, v) } else { ("", gv) }
}

fn is_subresource(name: &str) -> bool { name.contains('/') }

/// Fill `group`/`version` when absent or empty. Values of another type are
/// left alone so the extractor reports them.
fn fill_group_version(raw: &mut serde_json::Value, group: &str, version: &str) {
    if let Some(obj) = raw.as_object_mut() {
        for (key, val) in [("group", group), ("version", version)] {
            let empty = match obj.get(key) {
                None | Some(serde_json::Value::Null) => true,
                Some(serde_json::Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            if empty {
                obj.insert(key.to_string(), serde_json::Value::String(val.to_string()));
            }
        }
    }
}

/// Documents for every top-level resource of a typed discovery list.
pub fn documents_from_resource_list(list: &APIResourceList) -> Result<Vec<Document>> {
    let (group, version) = split_group_version(&list.group_version);
    let mut out = Vec::with_capacity(list.resources.len());
    for ar in &list.resources {
        if is_subresource(&ar.name) {
            debug!(name = %ar.name, gv = %list.group_version, "skipping subresource");
            continue;
        }
        let mut raw = serde_json::to_value(ar).context("serializing APIResource")?;
        fill_group_version(&mut raw, group, version);
        out.push(Document::from_json(&raw)?);
    }
    Ok(out)
}

/// Documents from untyped JSON.
///
/// Accepts a single resource document, an `APIResourceList`-shaped object
/// (`groupVersion` + `resources`), or an array mixing both. Lists are read
/// without typed deserialization so one malformed resource does not hide
/// the rest; non-object entries are skipped with a warning.
pub fn documents_from_json(v: &serde_json::Value) -> Result<Vec<Document>> {
    match v {
        serde_json::Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(documents_from_json(item)?);
            }
            Ok(out)
        }
        serde_json::Value::Object(obj) if obj.get("resources").map(|r| r.is_array()).unwrap_or(false) => {
            let gv = obj.get("groupVersion").and_then(|g| g.as_str()).unwrap_or("");
            let (group, version) = split_group_version(gv);
            let resources = obj.get("resources").and_then(|r| r.as_array()).map(Vec::as_slice).unwrap_or(&[]);
            let mut out = Vec::with_capacity(resources.len());
            for (idx, r) in resources.iter().enumerate() {
                if !r.is_object() {
                    warn!(gv = %gv, idx, "skipping non-object resource entry");
                    continue;
                }
                if let Some(name) = r.get("name").and_then(|n| n.as_str()) {
                    if is_subresource(name) {
                        debug!(name = %name, gv = %gv, "skipping subresource");
                        continue;
                    }
                }
                let mut raw = r.clone();
                if !gv.is_empty() {
                    fill_group_version(&mut raw, group, version);
                }
                out.push(Document::from_json(&raw)?);
            }
            Ok(out)
        }
        other => Ok(vec![Document::from_json(other).context("reading discovery document")?]),
    }
}
