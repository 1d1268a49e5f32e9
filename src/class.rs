//! # Model Classes
//!
//! [`ModelClass::extend`] turns a [`ModelSchema`] into a model type: it binds the schema, the
//! resource routes derived from it and a [`RemoteStore`], and exposes the collection-level
//! operations (`all`, `find`, `filter`).
//!
//! A `ModelClass` is cheap to clone; every instance it constructs shares the same schema and
//! store.
//!
//! ```rust
//! use resource_model::mock::MockStore;
//! use resource_model::{Attribute, ModelClass, ModelSchema};
//! use serde_json::json;
//!
//! let schema = ModelSchema::builder()
//!     .attributes(["id", "name"])
//!     .base_url("/cars")
//!     .build();
//! let cars = ModelClass::extend(schema, MockStore::new());
//!
//! let car = cars.new_instance(json!({"id": 1, "name": "Car"}).as_object().cloned().unwrap());
//! assert!(!car.is_new());
//! assert_eq!(car.url(), "/cars/1");
//! ```

use crate::collection::Collection;
use crate::error::ModelError;
use crate::model::{Model, Values};
use crate::routes::ResourceRoutes;
use crate::schema::{Attribute, ModelSchema};
use crate::store::RemoteStore;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

struct ClassInner {
    schema: ModelSchema,
    routes: ResourceRoutes,
    store: Arc<dyn RemoteStore>,
}

/// A model type produced from a schema.
#[derive(Clone)]
pub struct ModelClass {
    inner: Arc<ClassInner>,
}

impl ModelClass {
    /// Produces a model type bound to `store`.
    pub fn extend(schema: ModelSchema, store: impl RemoteStore + 'static) -> Self {
        Self::extend_shared(schema, Arc::new(store))
    }

    /// Like [`ModelClass::extend`], for a store shared with other model types.
    pub fn extend_shared(schema: ModelSchema, store: Arc<dyn RemoteStore>) -> Self {
        let routes = ResourceRoutes::new(schema.base_url(), schema.id_attribute());
        Self {
            inner: Arc::new(ClassInner {
                schema,
                routes,
                store,
            }),
        }
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.inner.schema
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.inner.schema.attribute(key)
    }

    pub fn id_attribute(&self) -> &str {
        self.inner.schema.id_attribute()
    }

    pub fn base_url(&self) -> &str {
        self.inner.schema.base_url()
    }

    pub fn routes(&self) -> &ResourceRoutes {
        &self.inner.routes
    }

    pub fn store(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.inner.store)
    }

    /// Constructs an instance, delegating to the schema's `initialize` hook when present.
    pub fn new_instance(&self, values: Values) -> Model {
        match self.inner.schema.initializer() {
            Some(initialize) => initialize(self, values),
            None => self.construct(values),
        }
    }

    /// The base construction path, bypassing `initialize`.
    pub fn construct(&self, values: Values) -> Model {
        Model::construct(self.clone(), values)
    }

    /// Loads every instance.
    #[instrument(skip(self), fields(resource = self.base_url()))]
    pub async fn all(&self) -> Result<Collection, ModelError> {
        self.filter(Values::new()).await
    }

    /// Loads the instance with the given id.
    #[instrument(skip(self, id), fields(resource = self.base_url()))]
    pub async fn find(&self, id: impl Into<Value>) -> Result<Model, ModelError> {
        let mut model = self.new_instance(Values::new());
        model.set(self.id_attribute(), id);
        model.fetch().await?;
        Ok(model)
    }

    /// Loads the instances matching `criteria`.
    #[instrument(skip(self), fields(resource = self.base_url()))]
    pub async fn filter(&self, criteria: Values) -> Result<Collection, ModelError> {
        let data = self.inner.store.list(&criteria).await?;
        let collection = Collection::with_data(self.clone(), data).await?;
        debug!(count = collection.len(), "Listed");
        Ok(collection)
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("schema", &self.inner.schema)
            .field("routes", &self.inner.routes)
            .finish()
    }
}
