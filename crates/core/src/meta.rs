//! Resource descriptor and the builder that assembles it from a discovery document.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Errors;
use crate::extract::{extract_all, FieldKind, FieldSpec};

/// Typed summary of one API resource kind.
///
/// Fields that failed extraction hold their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    /// Plural resource name, e.g. `destinationrules`.
    pub name: String,
    pub singular_name: String,
    pub kind: String,
    pub group: String,
    pub version: String,
    pub namespaced: bool,
    pub short_names: Vec<String>,
    pub verbs: Vec<String>,
}

impl ResourceMeta {
    pub fn gvk(&self) -> Gvk {
        Gvk { group: self.group.clone(), version: self.version.clone(), kind: self.kind.clone() }
    }

    pub fn supports(&self, verb: &str) -> bool { self.verbs.iter().any(|v| v == verb) }
}

/// Group/Version/Kind triple. The core group is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gvk {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl Gvk {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { group: group.into(), version: version.into(), kind: kind.into() }
    }

    /// `v1/Kind` for the core group, `group/v1/Kind` otherwise.
    pub fn key(&self) -> String {
        if self.group.is_empty() {
            format!("{}/{}", self.version, self.kind)
        } else {
            format!("{}/{}/{}", self.group, self.version, self.kind)
        }
    }

    /// Inverse of [`Gvk::key`].
    pub fn parse(key: &str) -> Option<Self> {
        let parts: Vec<&str> = key.split('/').collect();
        match parts.as_slice() {
            [version, kind] if !version.is_empty() && !kind.is_empty() => Some(Gvk::new("", *version, *kind)),
            [group, version, kind] if !group.is_empty() && !version.is_empty() && !kind.is_empty() => {
                Some(Gvk::new(*group, *version, *kind))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.key()) }
}

/// Descriptor fields in extraction order. Error order follows this table.
pub const META_FIELDS: [FieldSpec<'static>; 8] = [
    FieldSpec::required("name", FieldKind::Str),
    FieldSpec::required("singularName", FieldKind::Str),
    FieldSpec::required("kind", FieldKind::Str),
    FieldSpec::required("group", FieldKind::Str),
    FieldSpec::required("version", FieldKind::Str),
    FieldSpec::required("namespaced", FieldKind::Bool),
    FieldSpec::optional("shortNames", FieldKind::StrSeq),
    FieldSpec::optional("verbs", FieldKind::StrSeq),
];

/// Build a descriptor from `doc`, attempting every field.
///
/// The descriptor is always returned; `Errors` lists every field that could
/// not be read, in [`META_FIELDS`] order. Empty errors means success.
pub fn extract_meta(doc: &Document) -> (ResourceMeta, Errors) {
    let ([name, singular_name, kind, group, version, namespaced, short_names, verbs], errs) =
        extract_all(doc, &META_FIELDS, Errors::new());
    let meta = ResourceMeta {
        name: name.into_str(),
        singular_name: singular_name.into_str(),
        kind: kind.into_str(),
        group: group.into_str(),
        version: version.into_str(),
        namespaced: namespaced.into_bool(),
        short_names: short_names.into_str_seq(),
        verbs: verbs.into_str_seq(),
    };
    (meta, errs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gvk_key_round_trips() {
        let core = Gvk::new("", "v1", "Pod");
        assert_eq!(core.key(), "v1/Pod");
        assert_eq!(Gvk::parse("v1/Pod"), Some(core));
        let dr = Gvk::new("networking.istio.io", "v1alpha3", "DestinationRule");
        assert_eq!(dr.to_string(), "networking.istio.io/v1alpha3/DestinationRule");
        assert_eq!(Gvk::parse(&dr.key()), Some(dr));
        assert_eq!(Gvk::parse("Pod"), None);
        assert_eq!(Gvk::parse("a/b/c/d"), None);
        assert_eq!(Gvk::parse("/v1/Pod"), None);
    }

    #[test]
    fn descriptor_serializes_with_discovery_keys() {
        let meta = ResourceMeta { singular_name: "pod".into(), short_names: vec!["po".into()], ..Default::default() };
        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["singularName"], "pod");
        assert_eq!(v["shortNames"], serde_json::json!(["po"]));
        assert_eq!(v["namespaced"], false);
    }

    #[test]
    fn table_declares_only_scalars_as_required() {
        for spec in META_FIELDS.iter() {
            assert_eq!(spec.required, spec.kind.is_scalar(), "{}", spec.key);
        }
    }

    #[test]
    fn supports_verb() {
        let meta = ResourceMeta { verbs: vec!["get".into(), "list".into()], ..Default::default() };
        assert!(meta.supports("list"));
        assert!(!meta.supports("watch"));
    }
}
