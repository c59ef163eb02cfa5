//! Served versions of CRD-style documents (`versions: [{name, served}, ...]`).

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Errors;
use crate::extract::{extract_bool, extract_doc_seq, extract_str};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub served: bool,
}

/// Read every entry of `versions`. A missing list yields no entries and no
/// error; a malformed entry still yields a (zero-filled) `VersionInfo`.
pub fn extract_versions(doc: &Document) -> (Vec<VersionInfo>, Errors) {
    let (entries, errs) = extract_doc_seq(doc, "versions", Errors::new());
    entries.iter().fold((Vec::with_capacity(entries.len()), errs), |(mut out, errs), entry| {
        let (name, errs) = extract_str(entry, "name", errs);
        let (served, errs) = extract_bool(entry, "served", errs);
        out.push(VersionInfo { name, served });
        (out, errs)
    })
}

/// Names of the served versions, in document order.
pub fn served_versions(doc: &Document) -> Vec<String> {
    let (versions, _) = extract_versions(doc);
    versions.into_iter().filter(|v| v.served && !v.name.is_empty()).map(|v| v.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(v: serde_json::Value) -> Document { Document::from_json(&v).unwrap() }

    #[test]
    fn reads_each_entry() {
        let d = doc(serde_json::json!({
            "versions": [
                { "name": "v1alpha1", "served": false },
                { "name": "v1beta1", "served": true }
            ]
        }));
        let (vv, errs) = extract_versions(&d);
        assert!(errs.is_empty());
        assert_eq!(vv, vec![
            VersionInfo { name: "v1alpha1".into(), served: false },
            VersionInfo { name: "v1beta1".into(), served: true },
        ]);
        assert_eq!(served_versions(&d), vec!["v1beta1"]);
    }

    #[test]
    fn collects_entry_errors_in_order() {
        let d = doc(serde_json::json!({
            "versions": [ { "served": true }, { "name": "v2" } ]
        }));
        let (vv, errs) = extract_versions(&d);
        assert_eq!(vv.len(), 2);
        assert_eq!(vv[0].name, "");
        assert!(!vv[1].served);
        let msgs: Vec<String> = errs.iter().map(|e| e.to_string()).collect();
        assert_eq!(msgs, vec!["failed to extract string name", "failed to extract bool served"]);
        assert!(served_versions(&d).is_empty());
    }

    #[test]
    fn absent_list_is_empty() {
        let (vv, errs) = extract_versions(&Document::new());
        assert!(vv.is_empty());
        assert!(errs.is_empty());
    }
}
