//! Rule helpers shared by every request validator.
//!
//! Each helper returns `None` when the field is absent or invalid; invalid
//! fields always leave a message in the collected errors.

use super::{FieldValue, FormInput, ValidationErrors};
use crate::model::enums::FieldEnum;
use chrono::NaiveDate;
use uuid::Uuid;

/// Whether absent fields are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// Create semantics: every non-nullable field must be submitted.
    Required,
    /// Update semantics: absent fields are skipped, submitted ones validated.
    Sometimes,
}

pub(crate) struct Validator<'a> {
    input: &'a FormInput,
    presence: Presence,
    errors: ValidationErrors,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(input: &'a FormInput, presence: Presence) -> Self {
        Self {
            input,
            presence,
            errors: ValidationErrors::new(),
        }
    }

    pub(crate) fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// Returns the raw value of a non-nullable field.
    fn present(&mut self, field: &str) -> Option<&'a str> {
        match (self.input.value(field), self.presence) {
            (FieldValue::Present(raw), _) => Some(raw),
            (FieldValue::Missing, Presence::Sometimes) => None,
            (FieldValue::Missing, Presence::Required) | (FieldValue::Null, _) => {
                self.errors
                    .add(field, format!("The {} field is required.", attribute(field)));
                None
            }
        }
    }

    /// Returns the raw value of a nullable field.
    ///
    /// `None`: not submitted. `Some(None)`: submitted blank.
    fn nullable(&self, field: &str) -> Option<Option<&'a str>> {
        match self.input.value(field) {
            FieldValue::Missing => None,
            FieldValue::Null => Some(None),
            FieldValue::Present(raw) => Some(Some(raw)),
        }
    }

    pub(crate) fn enumeration<E: FieldEnum>(&mut self, field: &str) -> Option<E> {
        let raw = self.present(field)?;
        self.parse_enum(field, raw)
    }

    pub(crate) fn non_negative_integer(&mut self, field: &str) -> Option<u32> {
        let raw = self.present(field)?;
        self.parse_integer(field, raw)
    }

    pub(crate) fn non_negative_number(&mut self, field: &str) -> Option<f64> {
        let raw = self.present(field)?;
        self.parse_number(field, raw, None)
    }

    pub(crate) fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.present(field)?;
        self.parse_date(field, raw)
    }

    /// Reference to another record by id. Existence is checked by the caller.
    pub(crate) fn reference(&mut self, field: &str) -> Option<Uuid> {
        let raw = self.present(field)?;
        match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                self.invalid_selection(field);
                None
            }
        }
    }

    pub(crate) fn text(&mut self, field: &str, max_chars: usize) -> Option<String> {
        let raw = self.present(field)?;
        self.parse_text(field, raw, max_chars)
    }

    /// Nullable number; `max` adds an inclusive upper bound.
    pub(crate) fn nullable_number(
        &mut self,
        field: &str,
        max: Option<f64>,
    ) -> Option<Option<f64>> {
        match self.nullable(field)? {
            None => Some(None),
            Some(raw) => self.parse_number(field, raw, max).map(Some),
        }
    }

    pub(crate) fn nullable_integer(&mut self, field: &str) -> Option<Option<u32>> {
        match self.nullable(field)? {
            None => Some(None),
            Some(raw) => self.parse_integer(field, raw).map(Some),
        }
    }

    pub(crate) fn nullable_text(
        &mut self,
        field: &str,
        max_chars: usize,
    ) -> Option<Option<String>> {
        match self.nullable(field)? {
            None => Some(None),
            Some(raw) => self.parse_text(field, raw, max_chars).map(Some),
        }
    }

    pub(crate) fn invalid_selection(&mut self, field: &str) {
        self.errors
            .add(field, format!("The selected {} is invalid.", attribute(field)));
    }

    fn parse_enum<E: FieldEnum>(&mut self, field: &str, raw: &str) -> Option<E> {
        let parsed = E::parse(raw);
        if parsed.is_none() {
            self.invalid_selection(field);
        }
        parsed
    }

    fn parse_integer(&mut self, field: &str, raw: &str) -> Option<u32> {
        let Ok(value) = raw.parse::<i64>() else {
            self.errors.add(
                field,
                format!("The {} field must be an integer.", attribute(field)),
            );
            return None;
        };
        if value < 0 {
            self.errors.add(
                field,
                format!("The {} field must be at least 0.", attribute(field)),
            );
            return None;
        }
        match u32::try_from(value) {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(
                    field,
                    format!(
                        "The {} field must not be greater than {}.",
                        attribute(field),
                        u32::MAX
                    ),
                );
                None
            }
        }
    }

    fn parse_number(&mut self, field: &str, raw: &str, max: Option<f64>) -> Option<f64> {
        let value = match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                self.errors.add(
                    field,
                    format!("The {} field must be a number.", attribute(field)),
                );
                return None;
            }
        };
        if let Some(max) = max {
            if !(0.0..=max).contains(&value) {
                self.errors.add(
                    field,
                    format!(
                        "The {} field must be between 0 and {}.",
                        attribute(field),
                        max
                    ),
                );
                return None;
            }
        } else if value < 0.0 {
            self.errors.add(
                field,
                format!("The {} field must be at least 0.", attribute(field)),
            );
            return None;
        }
        Some(value)
    }

    fn parse_date(&mut self, field: &str, raw: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.errors.add(
                    field,
                    format!("The {} field must be a valid date.", attribute(field)),
                );
                None
            }
        }
    }

    fn parse_text(&mut self, field: &str, raw: &str, max_chars: usize) -> Option<String> {
        if raw.chars().count() > max_chars {
            self.errors.add(
                field,
                format!(
                    "The {} field must not be greater than {} characters.",
                    attribute(field),
                    max_chars
                ),
            );
            return None;
        }
        Some(raw.to_string())
    }
}

/// Human-readable attribute name used in messages (`age_value` -> `age value`).
pub(crate) fn attribute(field: &str) -> String {
    field.replace('_', " ")
}
