//! Declarative form validation.
//!
//! A [`Form`] wraps the submitted field values (one or more strings per field)
//! plus a map of field-keyed error messages. Rules are applied one at a time,
//! each appending at most one message per field; `valid()` simply asks whether
//! any field has accumulated an error. Rules other than `required` skip empty
//! values so that "blank" and "malformed" produce distinct messages.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Sanity-check pattern for email addresses (W3C HTML5 email pattern).
    /// Compiled once; anchored so only full-string matches pass.
    pub static ref EMAIL_RX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("email pattern must compile");
}

/// Field-keyed validation error messages. Message order within a field is the
/// order in which rules were applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    /// Appends an error message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First error message for a field, or `""` if the field has none.
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).and_then(|msgs| msgs.first()).map(String::as_str).unwrap_or("")
    }

    /// All messages recorded for a field, in insertion order.
    pub fn all(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A submitted form: field values plus accumulated validation errors.
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: HashMap<String, Vec<String>>,
    pub errors: FormErrors,
}

impl Form {
    /// Builds a form from decoded urlencoded pairs. Repeated fields keep all
    /// their values; `get` returns the first.
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            values.entry(key).or_default().push(value);
        }
        Self { values, errors: FormErrors::default() }
    }

    /// First submitted value for a field, or `""`.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).and_then(|vs| vs.first()).map(String::as_str).unwrap_or("")
    }

    /// Flags every listed field whose trimmed value is empty.
    pub fn required(&mut self, fields: &[&str]) {
        for &field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, "This field cannot be blank");
            }
        }
    }

    /// Flags a non-empty field longer than `max` characters (Unicode code
    /// points, not bytes).
    pub fn max_length(&mut self, field: &str, max: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() > max {
            self.errors.add(field, format!("This field is too long (maximum is {} characters)", max));
        }
    }

    /// Flags a non-empty field shorter than `min` characters.
    pub fn min_length(&mut self, field: &str, min: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() < min {
            self.errors.add(field, format!("This field is too short (minimum is {} characters)", min));
        }
    }

    /// Flags a non-empty field whose value is not one of `permitted`.
    pub fn permitted_values(&mut self, field: &str, permitted: &[&str]) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if !permitted.contains(&value) {
            self.errors.add(field, "This field is invalid");
        }
    }

    /// Flags a non-empty field that does not match `pattern`.
    pub fn matches_pattern(&mut self, field: &str, pattern: &Regex) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if !pattern.is_match(value) {
            self.errors.add(field, "This field is invalid");
        }
    }

    /// A form is valid iff no field has any error.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}
