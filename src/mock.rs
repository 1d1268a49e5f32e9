//! # Mock Store & Testing Guide
//!
//! [`MockStore`] implements [`RemoteStore`] entirely in memory from a queue of expectations.
//! Each call pops the next expectation; a call that does not match it panics. Every call is
//! also recorded, so tests can assert on what the model sent.
//!
//! | Feature | MockStore | StoreActor |
//! |---------|-----------|------------|
//! | **State** | None (scripted responses) | Real rows |
//! | **Error injection** | Easy (`return_err`) | Only `NotFound` |
//! | **Use case** | Model logic around the store | End-to-end flows |
//!
//! ```rust
//! use resource_model::mock::{MockStore, RecordedCall};
//! use resource_model::{ModelClass, ModelSchema, TransportError};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MockStore::new();
//!     store.expect_create().return_err(TransportError::Status { status: 500, body: json!(null) });
//!
//!     let schema = ModelSchema::builder().attributes(["id", "name"]).build();
//!     let cars = ModelClass::extend(schema, store.clone());
//!
//!     let mut car = cars.new_instance(Default::default());
//!     car.set("name", "Car");
//!     assert!(car.save().await.is_err());
//!     assert_eq!(car.get("id"), json!(null));
//!
//!     assert!(matches!(&store.calls()[0], RecordedCall::Create(body) if body["name"] == "Car"));
//!     store.verify();
//! }
//! ```

use crate::error::TransportError;
use crate::model::{Model, Values};
use crate::store::RemoteStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted response for the next store call.
#[derive(Debug)]
enum Expectation {
    Create(Result<Values, TransportError>),
    Update(Result<Values, TransportError>),
    Fetch(Result<Values, TransportError>),
    Delete(Result<(), TransportError>),
    List(Result<Value, TransportError>),
}

/// A store call as received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// The transfer object sent.
    Create(Values),
    /// The transfer object sent.
    Update(Values),
    /// The id of the instance fetched.
    Fetch(Option<Value>),
    /// The id of the instance deleted.
    Delete(Option<Value>),
    /// The criteria of the query.
    List(Values),
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

/// An expectation-driven [`RemoteStore`].
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    expectations: Expectations,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn builder<T>(&self, wrap: fn(Result<T, TransportError>) -> Expectation) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            wrap,
        }
    }

    pub fn expect_create(&self) -> ExpectationBuilder<Values> {
        self.builder(Expectation::Create)
    }

    pub fn expect_update(&self) -> ExpectationBuilder<Values> {
        self.builder(Expectation::Update)
    }

    pub fn expect_fetch(&self) -> ExpectationBuilder<Values> {
        self.builder(Expectation::Fetch)
    }

    pub fn expect_delete(&self) -> ExpectationBuilder<()> {
        self.builder(Expectation::Delete)
    }

    pub fn expect_list(&self) -> ExpectationBuilder<Value> {
        self.builder(Expectation::List)
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next(&self, call: RecordedCall) -> Expectation {
        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected store call: {call:?}");
        };
        self.calls.lock().unwrap().push(call);
        expectation
    }
}

/// Scripts the response of one expected call.
pub struct ExpectationBuilder<T> {
    expectations: Expectations,
    wrap: fn(Result<T, TransportError>) -> Expectation,
}

impl<T> ExpectationBuilder<T> {
    /// The call succeeds with `value`.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// The call fails with `error`.
    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, TransportError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(response));
    }
}

#[async_trait]
impl RemoteStore for MockStore {
    async fn create(&self, model: &Model) -> Result<Values, TransportError> {
        match self.next(RecordedCall::Create(model.to_transfer_object())) {
            Expectation::Create(response) => response,
            other => panic!("Expected create, mock was scripted with {other:?}"),
        }
    }

    async fn update(&self, model: &Model) -> Result<Values, TransportError> {
        match self.next(RecordedCall::Update(model.to_transfer_object())) {
            Expectation::Update(response) => response,
            other => panic!("Expected update, mock was scripted with {other:?}"),
        }
    }

    async fn fetch(&self, model: &Model) -> Result<Values, TransportError> {
        match self.next(RecordedCall::Fetch(model.id().cloned())) {
            Expectation::Fetch(response) => response,
            other => panic!("Expected fetch, mock was scripted with {other:?}"),
        }
    }

    async fn list(&self, criteria: &Values) -> Result<Value, TransportError> {
        match self.next(RecordedCall::List(criteria.clone())) {
            Expectation::List(response) => response,
            other => panic!("Expected list, mock was scripted with {other:?}"),
        }
    }

    async fn delete(&self, model: &Model) -> Result<(), TransportError> {
        match self.next(RecordedCall::Delete(model.id().cloned())) {
            Expectation::Delete(response) => response,
            other => panic!("Expected delete, mock was scripted with {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModelClass, ModelError, ModelSchema};
    use serde_json::json;

    fn cars(store: &MockStore) -> ModelClass {
        let schema = ModelSchema::builder()
            .attributes(["id", "name"])
            .base_url("/cars")
            .build();
        ModelClass::extend(schema, store.clone())
    }

    #[tokio::test]
    async fn test_mock_store_with_expectations() {
        let store = MockStore::new();
        store
            .expect_list()
            .return_ok(json!([{"id": 1, "name": "A"}]));
        store.expect_delete().return_ok(());

        let class = cars(&store);
        let collection = class.all().await.unwrap();
        collection[0].destroy().await.unwrap();

        assert_eq!(
            store.calls(),
            [
                RecordedCall::List(Values::new()),
                RecordedCall::Delete(Some(json!(1)))
            ]
        );
        store.verify();
    }

    #[tokio::test]
    async fn test_injected_error_is_propagated() {
        let store = MockStore::new();
        store
            .expect_fetch()
            .return_err(TransportError::NotFound("cars/9".into()));

        let err = cars(&store).find(9).await.unwrap_err();
        assert!(matches!(err, ModelError::Transport(TransportError::NotFound(_))));
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_detects_unmet_expectations() {
        let store = MockStore::new();
        store.expect_create().return_ok(Values::new());
        store.verify();
    }
}
