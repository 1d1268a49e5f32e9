//! # Model Errors
//!
//! This module defines the error types used throughout the model layer.
//!
//! - [`ValidationFailure`]: one attribute's validator rejected its value.
//! - [`AggregateValidationFailure`]: a whole-model validation failed; carries every error.
//! - [`TransportError`]: the remote store call itself failed. Opaque to the model, it is
//!   propagated unchanged to the caller.
//! - [`ModelError`]: the umbrella returned by model and collection operations.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Current validation errors, keyed by attribute.
pub type Errors = BTreeMap<String, Value>;

/// A single attribute failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid `{key}`: {}", display_message(.message))]
pub struct ValidationFailure {
    pub key: String,
    /// Validator-defined payload: usually a string, sometimes a structured object.
    pub message: Value,
}

/// One or more attributes failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} attribute(s) failed validation: {}", .errors.len(), ErrorKeys(.errors))]
pub struct AggregateValidationFailure {
    pub errors: Errors,
}

/// Errors raised by a [`RemoteStore`](crate::store::RemoteStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Resource already exists: {0}")]
    Conflict(String),
    #[error("Request failed with status {status}")]
    Status { status: u16, body: Value },
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by [`Model`](crate::model::Model), [`ModelClass`](crate::class::ModelClass)
/// and [`Collection`](crate::collection::Collection) operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Invalid(#[from] AggregateValidationFailure),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("Malformed list: {0}")]
    MalformedList(String),
}

impl ModelError {
    /// The aggregate error map, when this is a whole-model validation failure.
    pub fn errors(&self) -> Option<&Errors> {
        match self {
            ModelError::Invalid(failure) => Some(&failure.errors),
            _ => None,
        }
    }
}

fn display_message(message: &Value) -> String {
    match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

struct ErrorKeys<'a>(&'a Errors);

impl fmt::Display for ErrorKeys<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "{}", keys.join(", "))
    }
}
