//! Kindex core: discovery document model and resource metadata extraction.
//!
//! [`extract_meta`] turns one discovery [`Document`] into a [`ResourceMeta`]
//! plus the ordered [`Errors`] of every field it could not read. It never
//! stops at the first bad field and never logs; the caller decides what the
//! errors mean.

#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod extract;
pub mod meta;
pub mod versions;

pub use document::{Document, Value};
pub use error::{DocumentError, Errors, FieldError};
pub use extract::{
    extract, extract_all, extract_bool, extract_doc_seq, extract_str, extract_str_seq, Extracted, FieldKind,
    FieldSpec,
};
pub use meta::{extract_meta, Gvk, ResourceMeta, META_FIELDS};
pub use versions::{extract_versions, served_versions, VersionInfo};

pub mod prelude {
    pub use super::{extract_meta, Document, Errors, FieldError, Gvk, ResourceMeta, Value};
}
