//! Field-level extraction errors and the ordered accumulator threaded through a pass.

#![forbid(unsafe_code)]

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

/// One failed field extraction.
///
/// Both variants render as `failed to extract <ty> <field>`; the variant only
/// records whether the key was absent or held a value of another shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("failed to extract {ty} {field}")]
    Missing { field: String, ty: &'static str },
    #[error("failed to extract {ty} {field}")]
    WrongType { field: String, ty: &'static str },
}

impl FieldError {
    pub fn missing(field: impl Into<String>, ty: &'static str) -> Self {
        FieldError::Missing { field: field.into(), ty }
    }

    pub fn wrong_type(field: impl Into<String>, ty: &'static str) -> Self {
        FieldError::WrongType { field: field.into(), ty }
    }

    pub fn field(&self) -> &str {
        match self {
            FieldError::Missing { field, .. } | FieldError::WrongType { field, .. } => field,
        }
    }

    pub fn ty(&self) -> &'static str {
        match self {
            FieldError::Missing { ty, .. } | FieldError::WrongType { ty, .. } => ty,
        }
    }

    pub fn is_missing(&self) -> bool { matches!(self, FieldError::Missing { .. }) }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut st = s.serialize_struct("FieldError", 3)?;
        st.serialize_field("field", self.field())?;
        st.serialize_field("cause", if self.is_missing() { "missing" } else { "wrong_type" })?;
        st.serialize_field("reason", &self.to_string())?;
        st.end()
    }
}

/// Ordered, append-only sequence of field errors.
///
/// Inline capacity covers one error per required scalar of a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Errors(SmallVec<[FieldError; 6]>);

impl Errors {
    pub fn new() -> Self { Self::default() }

    /// Append and hand the sequence back; extractors thread it through this.
    #[must_use]
    pub fn with(mut self, err: FieldError) -> Self {
        self.0.push(err);
        self
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> { self.0.iter() }
    pub fn as_slice(&self) -> &[FieldError] { &self.0 }

    /// Field names in error order.
    pub fn fields(&self) -> Vec<&str> { self.0.iter().map(FieldError::field).collect() }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

impl IntoIterator for Errors {
    type Item = FieldError;
    type IntoIter = smallvec::IntoIter<[FieldError; 6]>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl FromIterator<FieldError> for Errors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

/// Failure to obtain a document from raw JSON.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("discovery document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("invalid discovery JSON: {0}")]
    Json(#[from] serde_json::Error),
}
