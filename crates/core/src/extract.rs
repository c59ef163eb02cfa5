//! Schema-driven field extraction.
//!
//! Every field is declared as a [`FieldSpec`] row and read through
//! [`extract`], the single place that matches a [`FieldKind`] against a
//! document [`Value`]. Extraction never fails outright: a problem yields the
//! kind's zero value plus, where the contract calls for one, a [`FieldError`]
//! appended to the [`Errors`] passed in.
//!
//! Scalar and sequence kinds differ on purpose:
//! - scalars: absent (when required) or mistyped ⇒ zero value + error
//! - sequences: absent ⇒ empty, no error; present with a foreign shape
//!   (not a sequence, or any element of another type) ⇒ treated as absent

#![forbid(unsafe_code)]

use crate::document::{Document, Value};
use crate::error::{Errors, FieldError};

/// Shape a field is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Str,
    Bool,
    StrSeq,
    DocSeq,
}

impl FieldKind {
    /// Name used in error messages (`failed to extract <name> <field>`).
    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Str => "string",
            FieldKind::Bool => "bool",
            FieldKind::StrSeq => "[]string",
            FieldKind::DocSeq => "[]document",
        }
    }

    pub fn is_scalar(self) -> bool { matches!(self, FieldKind::Str | FieldKind::Bool) }
}

/// A value pulled out of a document, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Str(String),
    Bool(bool),
    StrSeq(Vec<String>),
    DocSeq(Vec<Document>),
}

impl Extracted {
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Str => Extracted::Str(String::new()),
            FieldKind::Bool => Extracted::Bool(false),
            FieldKind::StrSeq => Extracted::StrSeq(Vec::new()),
            FieldKind::DocSeq => Extracted::DocSeq(Vec::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Extracted::Str(_) => FieldKind::Str,
            Extracted::Bool(_) => FieldKind::Bool,
            Extracted::StrSeq(_) => FieldKind::StrSeq,
            Extracted::DocSeq(_) => FieldKind::DocSeq,
        }
    }

    // The into_* accessors fall back to the zero value on a kind mismatch;
    // `extract` always returns the kind it was asked for.

    pub fn into_str(self) -> String {
        match self { Extracted::Str(s) => s, _ => String::new() }
    }

    pub fn into_bool(self) -> bool {
        match self { Extracted::Bool(b) => b, _ => false }
    }

    pub fn into_str_seq(self) -> Vec<String> {
        match self { Extracted::StrSeq(v) => v, _ => Vec::new() }
    }

    pub fn into_doc_seq(self) -> Vec<Document> {
        match self { Extracted::DocSeq(v) => v, _ => Vec::new() }
    }
}

/// One row of an extraction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec<'a> {
    pub key: &'a str,
    pub kind: FieldKind,
    /// Whether absence is reported as an error.
    pub required: bool,
}

impl<'a> FieldSpec<'a> {
    pub const fn required(key: &'a str, kind: FieldKind) -> Self { Self { key, kind, required: true } }
    pub const fn optional(key: &'a str, kind: FieldKind) -> Self { Self { key, kind, required: false } }
}

/// Extract one field according to `spec`, threading `errs` through.
pub fn extract(doc: &Document, spec: &FieldSpec<'_>, errs: Errors) -> (Extracted, Errors) {
    let zero = || Extracted::zero(spec.kind);
    let Some(value) = doc.get(spec.key) else {
        if spec.required {
            return (zero(), errs.with(FieldError::missing(spec.key, spec.kind.type_name())));
        }
        return (zero(), errs);
    };
    match cast(spec.kind, value) {
        Some(v) => (v, errs),
        None if spec.kind.is_scalar() => (zero(), errs.with(FieldError::wrong_type(spec.key, spec.kind.type_name()))),
        None => (zero(), errs),
    }
}

/// Run a whole table in order. Each row sees the errors of all rows before it.
pub fn extract_all<const N: usize>(doc: &Document, specs: &[FieldSpec<'_>; N], errs: Errors) -> ([Extracted; N], Errors) {
    let mut errs = errs;
    let values = std::array::from_fn(|i| {
        let (v, next) = extract(doc, &specs[i], std::mem::take(&mut errs));
        errs = next;
        v
    });
    (values, errs)
}

fn cast(kind: FieldKind, value: &Value) -> Option<Extracted> {
    match (kind, value) {
        (FieldKind::Str, Value::Str(s)) => Some(Extracted::Str(s.clone())),
        (FieldKind::Bool, Value::Bool(b)) => Some(Extracted::Bool(*b)),
        (FieldKind::StrSeq, Value::Seq(items)) => items
            .iter()
            .map(|v| match v { Value::Str(s) => Some(s.clone()), _ => None })
            .collect::<Option<Vec<_>>>()
            .map(Extracted::StrSeq),
        (FieldKind::DocSeq, Value::Seq(items)) => items
            .iter()
            .map(|v| match v { Value::Doc(d) => Some(d.clone()), _ => None })
            .collect::<Option<Vec<_>>>()
            .map(Extracted::DocSeq),
        _ => None,
    }
}

/// Required string field.
pub fn extract_str(doc: &Document, key: &str, errs: Errors) -> (String, Errors) {
    let (v, errs) = extract(doc, &FieldSpec::required(key, FieldKind::Str), errs);
    (v.into_str(), errs)
}

/// Required boolean field.
pub fn extract_bool(doc: &Document, key: &str, errs: Errors) -> (bool, Errors) {
    let (v, errs) = extract(doc, &FieldSpec::required(key, FieldKind::Bool), errs);
    (v.into_bool(), errs)
}

/// Optional sequence of strings; never appends an error.
pub fn extract_str_seq(doc: &Document, key: &str, errs: Errors) -> (Vec<String>, Errors) {
    let (v, errs) = extract(doc, &FieldSpec::optional(key, FieldKind::StrSeq), errs);
    (v.into_str_seq(), errs)
}

/// Optional sequence of nested documents; never appends an error.
pub fn extract_doc_seq(doc: &Document, key: &str, errs: Errors) -> (Vec<Document>, Errors) {
    let (v, errs) = extract(doc, &FieldSpec::optional(key, FieldKind::DocSeq), errs);
    (v.into_doc_seq(), errs)
}
