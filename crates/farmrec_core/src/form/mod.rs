//! Form input parsing and field-level validation.
//!
//! # Responsibility
//! - Represent submitted form fields (form-encoded or JSON string values).
//! - Turn raw fields into validated create/update/removal requests.
//! - Report every failing field with user-facing messages.
//!
//! # Invariants
//! - Values are trimmed; an empty value is treated as null.
//! - No field is silently coerced: a value that fails its rule is an error,
//!   never a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod requests;
pub(crate) mod validator;

pub use requests::{
    validate_crab_changes, validate_lookup_label, validate_new_crab, validate_new_pond,
    validate_pond_changes, validate_removal, REMOVAL_REASON_FIELD,
};

/// Raw submitted fields keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormInput {
    fields: BTreeMap<String, String>,
}

/// Presence state of one submitted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Field was not submitted.
    Missing,
    /// Field was submitted blank.
    Null,
    /// Field was submitted with a trimmed, non-empty value.
    Present(&'a str),
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for callers assembling input in code.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the presence state of `field`.
    pub fn value(&self, field: &str) -> FieldValue<'_> {
        match self.fields.get(field) {
            None => FieldValue::Missing,
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    FieldValue::Null
                } else {
                    FieldValue::Present(trimmed)
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormInput {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut input = Self::new();
        for (field, value) in iter {
            input.insert(field, value);
        }
        input
    }
}

/// Per-field validation messages, returned to the submitting form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set with one message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Failing field names in sorted order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid fields: {}", self.field_names().join(", "))
    }
}

impl Error for ValidationErrors {}
