//! Declarative field rules shared by the request types.
//!
//! Request structs derive `validator::Validate` for the individual rules and
//! implement [`FieldOrder`] to declare the order their violations are reported in.
//! [`RuleSet`] runs several inputs (path, body, query) and accumulates every
//! violation before the handler body is reached.

use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

lazy_static! {
    // Document store identifier syntax: 12 bytes rendered as 24 hex characters
    pub static ref OBJECT_ID_REGEX: regex::Regex = regex::Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();
}

/// A single rule violation as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Declares the order in which a request type's fields are checked.
pub trait FieldOrder {
    const FIELDS: &'static [&'static str];
}

/// Accumulates violations across the inputs of a single request.
#[derive(Debug, Default)]
pub struct RuleSet {
    errors: Vec<FieldError>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the rules of `input`, appending its violations in declared field order.
    pub fn check<T: Validate + FieldOrder>(mut self, input: &T) -> Self {
        if let Err(errors) = input.validate() {
            self.errors.extend(ordered(&errors, T::FIELDS));
        }
        self
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

fn ordered(errors: &ValidationErrors, fields: &'static [&'static str]) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    fields
        .iter()
        .filter_map(|field| by_field.get(field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                FieldError::new(field, message)
            })
        })
        .collect()
}

/// Reads the loose boolean forms accepted by the API: JSON booleans, the
/// numbers `1`/`0`, and the strings `"true"`, `"false"`, `"1"`, `"0"`.
pub fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => parse_boolean(s),
        _ => None,
    }
}

pub fn parse_boolean(text: &str) -> Option<bool> {
    match text {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Takes the text out of a JSON string. Any other kind of value yields `None`.
pub fn into_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        _ => None,
    }
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

fn non_empty_text(value: &Value, message: &'static str) -> Result<(), ValidationError> {
    match value {
        Value::String(text) if !text.is_empty() => Ok(()),
        _ => Err(violation("text", message)),
    }
}

pub fn validate_boolean(value: &Value) -> Result<(), ValidationError> {
    coerce_boolean(value)
        .map(|_| ())
        .ok_or_else(|| violation("boolean", "Completed must be a boolean"))
}

pub fn validate_title_required(value: &Value) -> Result<(), ValidationError> {
    non_empty_text(value, "Title is required")
}

pub fn validate_title_not_empty(value: &Value) -> Result<(), ValidationError> {
    non_empty_text(value, "Title cannot be empty")
}

pub fn validate_username(value: &Value) -> Result<(), ValidationError> {
    non_empty_text(value, "Username is required")
}

pub fn validate_password(value: &Value) -> Result<(), ValidationError> {
    non_empty_text(value, "Password is required")
}

pub fn validate_description(value: &Value) -> Result<(), ValidationError> {
    non_empty_text(value, "Description cannot be empty")
}
