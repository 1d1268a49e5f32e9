//! # Remote Store Contract
//!
//! The interface model instances and model classes call to read and write their remote
//! resource. Concrete bindings live in [`http`](crate::http) (request building over an injected
//! transport), [`memory`](crate::memory) (an in-process actor) and [`mock`](crate::mock)
//! (expectation-driven test double).
//!
//! Every method receives the instance itself; implementations read what they need from it
//! ([`Model::id`], [`Model::is_new`], [`Model::to_transfer_object`]). Responses are transfer
//! objects, parsed back into the instance through [`Model::parse`].

use crate::error::TransportError;
use crate::model::{Model, Values};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Sends the transfer object to the collection endpoint with the creation verb.
    async fn create(&self, model: &Model) -> Result<Values, TransportError>;

    /// Sends the transfer object to the member endpoint with the update verb.
    async fn update(&self, model: &Model) -> Result<Values, TransportError>;

    /// Reads the member endpoint.
    async fn fetch(&self, model: &Model) -> Result<Values, TransportError>;

    /// Reads the collection endpoint. The response is handed to
    /// [`Collection::parse`](crate::collection::Collection::parse) as-is.
    async fn list(&self, criteria: &Values) -> Result<Value, TransportError>;

    /// Deletes the member resource.
    async fn delete(&self, model: &Model) -> Result<(), TransportError>;
}

/// Interprets a response body as a transfer object.
pub fn expect_object(body: Value) -> Result<Values, TransportError> {
    match body {
        Value::Object(values) => Ok(values),
        other => Err(TransportError::Malformed(format!(
            "expected an object, got {other}"
        ))),
    }
}
