//! # Model Schema
//!
//! A [`ModelSchema`] is the immutable description of one model type: its declared
//! [`Attribute`]s (in declaration order), the id attribute, the resource base URL and the
//! optional `initialize` / `parse_list` hooks.
//!
//! Each attribute may override how it is read, written and validated. Overrides receive a
//! callback for the default behaviour, so a custom getter can decorate the stored value
//! without re-implementing storage:
//!
//! ```rust
//! use resource_model::{Attribute, ModelSchema, ValidationOutcome};
//! use serde_json::Value;
//!
//! let schema = ModelSchema::builder()
//!     .attribute(Attribute::new("id"))
//!     .attribute(
//!         Attribute::new("name")
//!             .with_setter(|value, super_set| match value {
//!                 Value::String(s) => super_set(Value::String(s.trim().to_owned())),
//!                 other => super_set(other),
//!             })
//!             .with_validator(|value| match value.as_str() {
//!                 Some(name) if !name.trim().is_empty() => ValidationOutcome::Valid,
//!                 _ => ValidationOutcome::invalid("Name is required"),
//!             }),
//!     )
//!     .base_url("/cars")
//!     .build();
//!
//! assert_eq!(schema.id_attribute(), "id");
//! assert_eq!(schema.keys().collect::<Vec<_>>(), ["id", "name"]);
//! ```

use crate::class::ModelClass;
use crate::model::{Model, Values};
use crate::validation::ValidationOutcome;
use futures_util::future::{self, BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Custom read transform. Receives a thunk returning the raw stored value.
pub type Getter = Arc<dyn Fn(&dyn Fn() -> Value) -> Value + Send + Sync>;

/// Custom write transform. Receives the new value and the canonical set path.
pub type Setter = Arc<dyn Fn(Value, &mut dyn FnMut(Value)) + Send + Sync>;

/// Attribute validator. Invoked with the current raw value.
pub type Validator = Arc<dyn Fn(&Value) -> ValidationOutcome + Send + Sync>;

/// Replaces the default construction path of a model type.
pub type Initializer = Arc<dyn Fn(&ModelClass, Values) -> Model + Send + Sync>;

/// Pre-transforms list responses before rows are parsed into a collection.
pub type ListParser = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

/// Static description of one declared field.
#[derive(Clone)]
pub struct Attribute {
    key: String,
    get: Option<Getter>,
    set: Option<Setter>,
    validate: Option<Validator>,
}

impl Attribute {
    /// A raw passthrough attribute that is always valid.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            get: None,
            set: None,
            validate: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn with_getter<V>(mut self, get: impl Fn(&dyn Fn() -> Value) -> V + Send + Sync + 'static) -> Self
    where
        V: Into<Value>,
    {
        self.get = Some(Arc::new(move |super_get: &dyn Fn() -> Value| get(super_get).into()));
        self
    }

    pub fn with_setter(mut self, set: impl Fn(Value, &mut dyn FnMut(Value)) + Send + Sync + 'static) -> Self {
        self.set = Some(Arc::new(set));
        self
    }

    /// Installs a validator whose result is known immediately (or is itself a
    /// [`ValidationOutcome::Pending`]).
    pub fn with_validator<O>(mut self, validate: impl Fn(&Value) -> O + Send + Sync + 'static) -> Self
    where
        O: Into<ValidationOutcome>,
    {
        self.validate = Some(Arc::new(move |value: &Value| validate(value).into()));
        self
    }

    /// Installs an asynchronous validator. The value is cloned into the future.
    pub fn with_async_validator<F, Fut, O>(mut self, validate: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<ValidationOutcome> + 'static,
    {
        self.validate = Some(Arc::new(move |value: &Value| {
            ValidationOutcome::pending(validate(value.clone()))
        }));
        self
    }

    pub fn has_getter(&self) -> bool {
        self.get.is_some()
    }

    pub fn has_setter(&self) -> bool {
        self.set.is_some()
    }

    pub fn has_validator(&self) -> bool {
        self.validate.is_some()
    }

    /// Reads through the custom getter, or returns `super_get()` when there is none.
    pub fn read(&self, super_get: &dyn Fn() -> Value) -> Value {
        match &self.get {
            Some(get) => get(super_get),
            None => super_get(),
        }
    }

    /// Writes through the custom setter, or calls `super_set(value)` when there is none.
    pub fn write(&self, value: Value, super_set: &mut dyn FnMut(Value)) {
        match &self.set {
            Some(set) => set(value, super_set),
            None => super_set(value),
        }
    }

    /// Runs the validator. Attributes without one always succeed.
    pub fn check(&self, value: &Value) -> ValidationOutcome {
        match &self.validate {
            Some(validate) => validate(value),
            None => ValidationOutcome::Valid,
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("key", &self.key)
            .field("get", &self.has_getter())
            .field("set", &self.has_setter())
            .field("validate", &self.has_validator())
            .finish()
    }
}

/// Immutable description of a model type, consumed by [`ModelClass::extend`].
#[derive(Clone)]
pub struct ModelSchema {
    attributes: IndexMap<String, Attribute>,
    id_attribute: String,
    base_url: String,
    initialize: Option<Initializer>,
    parse_list: Option<ListParser>,
}

impl ModelSchema {
    pub fn builder() -> ModelSchemaBuilder {
        ModelSchemaBuilder::default()
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn is_declared(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn initializer(&self) -> Option<&Initializer> {
        self.initialize.as_ref()
    }

    pub fn list_parser(&self) -> Option<&ListParser> {
        self.parse_list.as_ref()
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("attributes", &self.attributes.values().collect::<Vec<_>>())
            .field("id_attribute", &self.id_attribute)
            .field("base_url", &self.base_url)
            .field("initialize", &self.initialize.is_some())
            .field("parse_list", &self.parse_list.is_some())
            .finish()
    }
}

/// Builder for [`ModelSchema`].
pub struct ModelSchemaBuilder {
    attributes: IndexMap<String, Attribute>,
    id_attribute: String,
    base_url: String,
    initialize: Option<Initializer>,
    parse_list: Option<ListParser>,
}

impl Default for ModelSchemaBuilder {
    fn default() -> Self {
        Self {
            attributes: IndexMap::new(),
            id_attribute: "id".to_owned(),
            base_url: String::new(),
            initialize: None,
            parse_list: None,
        }
    }
}

impl ModelSchemaBuilder {
    /// Declares an attribute. Redeclaring a key replaces the earlier declaration in place.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute.key.clone(), attribute);
        self
    }

    /// Declares several passthrough attributes at once.
    pub fn attributes<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            self = self.attribute(Attribute::new(key));
        }
        self
    }

    pub fn id_attribute(mut self, key: impl Into<String>) -> Self {
        self.id_attribute = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Replaces the default constructor. The hook may call
    /// [`ModelClass::construct`] to run the base construction path.
    pub fn initialize(mut self, init: impl Fn(&ModelClass, Values) -> Model + Send + Sync + 'static) -> Self {
        self.initialize = Some(Arc::new(init));
        self
    }

    pub fn parse_list(mut self, parse: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.parse_list = Some(Arc::new(move |data: Value| future::ready(parse(data)).boxed()));
        self
    }

    pub fn parse_list_async<F, Fut>(mut self, parse: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.parse_list = Some(Arc::new(move |data: Value| parse(data).boxed()));
        self
    }

    pub fn build(self) -> ModelSchema {
        ModelSchema {
            attributes: self.attributes,
            id_attribute: self.id_attribute,
            base_url: self.base_url,
            initialize: self.initialize,
            parse_list: self.parse_list,
        }
    }
}
