//! Kindex registry: resource descriptors indexed by GVK and by alias.
//!
//! A [`Registry`] is a plain value owned by its caller; several can coexist
//! (one per cluster context, one per test). Registration runs the core
//! extractor and applies a [`Policy`] to the resulting field errors.

#![forbid(unsafe_code)]

use std::str::FromStr;

use kindex_core::{extract_meta, Document, Errors, Gvk, ResourceMeta};
use metrics::{counter, gauge};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What to do with a document whose extraction reported errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Any field error blocks registration.
    Strict,
    /// Register the best-effort descriptor and keep the errors as diagnostics.
    #[default]
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy {0:?} (expected strict or lenient)")]
pub struct PolicyParseError(pub String);

impl FromStr for Policy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Policy::Strict),
            "lenient" => Ok(Policy::Lenient),
            other => Err(PolicyParseError(other.to_string())),
        }
    }
}

/// Result of registering one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Registered { gvk: Gvk, errors: Errors },
    Skipped { errors: Errors },
}

impl Outcome {
    pub fn is_registered(&self) -> bool { matches!(self, Outcome::Registered { .. }) }

    pub fn errors(&self) -> &Errors {
        match self {
            Outcome::Registered { errors, .. } | Outcome::Skipped { errors } => errors,
        }
    }
}

/// Field errors recorded for one registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Position of the document in registration order.
    pub seq: u64,
    /// GVK key as far as it could be read (may contain empty segments).
    pub gvk: String,
    pub registered: bool,
    pub errors: Errors,
}

pub struct Registry {
    policy: Policy,
    by_gvk: FxHashMap<Gvk, ResourceMeta>,
    aliases: FxHashMap<String, Gvk>,
    diagnostics: Vec<Diagnostic>,
    seq: u64,
}

impl Default for Registry {
    fn default() -> Self { Self::new(Policy::default()) }
}

impl Registry {
    pub fn new(policy: Policy) -> Self {
        Self { policy, by_gvk: FxHashMap::default(), aliases: FxHashMap::default(), diagnostics: Vec::new(), seq: 0 }
    }

    pub fn policy(&self) -> Policy { self.policy }
    pub fn len(&self) -> usize { self.by_gvk.len() }
    pub fn is_empty(&self) -> bool { self.by_gvk.is_empty() }

    /// Extract and, policy permitting, index one discovery document.
    pub fn register(&mut self, doc: &Document) -> Outcome {
        let seq = self.seq;
        self.seq = self.seq.saturating_add(1);
        let (meta, errors) = extract_meta(doc);
        let gvk = meta.gvk();

        // Without kind and version there is no key to index under; lenient
        // registration would collapse such documents onto one entry.
        let addressable = !gvk.kind.is_empty() && !gvk.version.is_empty();
        let admit = addressable && (errors.is_empty() || self.policy == Policy::Lenient);
        if !errors.is_empty() || !addressable {
            warn!(gvk = %gvk, errors = errors.len(), fields = ?errors.fields(), admitted = admit, "discovery document has field errors");
            counter!("registry_field_errors_total", errors.len() as u64);
            self.diagnostics.push(Diagnostic { seq, gvk: gvk.key(), registered: admit, errors: errors.clone() });
        }
        if !admit {
            counter!("registry_skipped_total", 1u64);
            return Outcome::Skipped { errors };
        }

        self.index(meta);
        counter!("registry_registered_total", 1u64);
        gauge!("registry_kinds", self.by_gvk.len() as f64);
        Outcome::Registered { gvk, errors }
    }

    pub fn register_all<'a, I>(&mut self, docs: I) -> Vec<Outcome>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let out: Vec<Outcome> = docs.into_iter().map(|d| self.register(d)).collect();
        let registered = out.iter().filter(|o| o.is_registered()).count();
        info!(documents = out.len(), registered, kinds = self.by_gvk.len(), "registered discovery documents");
        out
    }

    fn index(&mut self, meta: ResourceMeta) {
        let gvk = meta.gvk();
        if self.by_gvk.contains_key(&gvk) {
            self.aliases.retain(|_, g| g != &gvk);
        }
        let names = meta
            .short_names
            .iter()
            .chain([&meta.name, &meta.singular_name])
            .filter(|n| !n.is_empty())
            .map(|n| n.to_ascii_lowercase());
        for alias in names {
            if let Some(prev) = self.aliases.insert(alias.clone(), gvk.clone()) {
                if prev != gvk {
                    debug!(alias = %alias, from = %prev, to = %gvk, "alias rebound");
                }
            }
        }
        if self.by_gvk.insert(gvk.clone(), meta).is_some() {
            debug!(gvk = %gvk, "descriptor replaced");
        }
    }

    pub fn get(&self, gvk: &Gvk) -> Option<&ResourceMeta> { self.by_gvk.get(gvk) }

    /// Resolve a user-supplied name: short name, plural or singular name
    /// (case-insensitive), or a GVK key such as `apps/v1/Deployment`.
    pub fn resolve(&self, alias: &str) -> Option<&ResourceMeta> {
        let alias = alias.trim();
        if let Some(gvk) = self.aliases.get(&alias.to_ascii_lowercase()) {
            return self.by_gvk.get(gvk);
        }
        Gvk::parse(alias).and_then(|gvk| self.by_gvk.get(&gvk))
    }

    /// Descriptors sorted by GVK.
    pub fn list(&self) -> Vec<&ResourceMeta> {
        let mut out: Vec<&ResourceMeta> = self.by_gvk.values().collect();
        out.sort_by(|a, b| {
            a.group.cmp(&b.group).then(a.version.cmp(&b.version)).then(a.kind.cmp(&b.kind))
        });
        out
    }

    /// Aliases bound to `gvk`, sorted.
    pub fn aliases_of(&self, gvk: &Gvk) -> Vec<&str> {
        let mut out: Vec<&str> = self.aliases.iter().filter(|(_, g)| *g == gvk).map(|(a, _)| a.as_str()).collect();
        out.sort_unstable();
        out
    }

    pub fn diagnostics(&self) -> &[Diagnostic] { &self.diagnostics }

    /// Hand over the recorded diagnostics, leaving the list empty.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> { std::mem::take(&mut self.diagnostics) }
}
