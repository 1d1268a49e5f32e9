//! # Model Instances
//!
//! A [`Model`] is one record of a model type. It holds the current raw values, the snapshot
//! taken at the last commit point, the keys changed since then, and the validation state.
//!
//! ## Commit points
//!
//! Construction, [`Model::parse`] and [`Model::reset`] snapshot the current values and mark
//! the instance pristine. [`Model::clear`] restores the snapshot instead.
//!
//! ## Reading and writing
//!
//! - [`Model::get`] / [`Model::set`] are the raw paths. `set` is the canonical set path: it
//!   marks the instance dirty, records the change, stores the value and schedules a
//!   validation of that key.
//! - [`Model::attribute`] / [`Model::set_attribute`] are the accessor paths. They run the
//!   attribute's custom getter/setter, which receive the raw paths as their `super`.
//!
//! Validation triggered by `set` is fire-and-forget. Synchronous validator results are applied
//! before `set` returns; asynchronous ones run as spawned tokio tasks, so calling `set` on an
//! attribute with an async validator requires a tokio runtime. [`Model::settle`] waits for
//! those tasks.

use crate::class::ModelClass;
use crate::error::{AggregateValidationFailure, Errors, ModelError, ValidationFailure};
use crate::validation::{ValidationEngine, ValidationOutcome};
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// A mapping of attribute keys to raw values. Also the transfer object shape.
pub type Values = Map<String, Value>;

/// One record of a model type.
pub struct Model {
    class: ModelClass,
    values: Values,
    previous_values: Values,
    changed: Values,
    pristine: bool,
    validation: ValidationEngine,
    pending: Vec<JoinHandle<()>>,
}

impl Model {
    /// The base construction path: starts with no value set, then parses `values` in.
    pub(crate) fn construct(class: ModelClass, values: Values) -> Self {
        let mut model = Self {
            class,
            values: Values::new(),
            previous_values: Values::new(),
            changed: Values::new(),
            pristine: true,
            validation: ValidationEngine::new(),
            pending: Vec::new(),
        };
        model.parse(values);
        model
    }

    pub fn class(&self) -> &ModelClass {
        &self.class
    }

    // --- Raw access ---

    /// The raw stored value. Unset attributes, declared or not, read as `null`.
    pub fn get(&self, key: &str) -> Value {
        self.values.get(key).cloned().unwrap_or(Value::Null)
    }

    /// The raw stored value deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_value(self.get(key)).ok()
    }

    /// The canonical set path. Setting `null` is an explicit value, sent to the store as such.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime if the attribute's validator returns a
    /// pending outcome, since the validation is spawned onto the runtime.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        debug!(resource = self.class.base_url(), key, %value, "Set");
        self.pristine = false;
        self.changed.insert(key.to_owned(), value.clone());
        self.values.insert(key.to_owned(), value);

        let outcome = self.check(key);
        if let Some(handle) = self.validation.dispatch(key, outcome) {
            self.pending.retain(|handle| !handle.is_finished());
            self.pending.push(handle);
        }
    }

    // --- Accessors ---

    /// Reads an attribute through its custom getter.
    pub fn attribute(&self, key: &str) -> Value {
        let raw = || self.get(key);
        match self.class.schema().attribute(key) {
            Some(attribute) => attribute.read(&raw),
            None => raw(),
        }
    }

    /// Writes an attribute through its custom setter.
    ///
    /// # Panics
    ///
    /// Same as [`Model::set`]: an async validator needs a tokio runtime.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let class = self.class.clone();
        match class.schema().attribute(key) {
            Some(attribute) => attribute.write(value, &mut |value| self.set(key, value)),
            None => self.set(key, value),
        }
    }

    // --- State ---

    /// Every value set so far. Declared attributes that were never set are absent.
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// True iff `key` holds a value, `null` included.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn previous_values(&self) -> &Values {
        &self.previous_values
    }

    /// Keys mutated since the last commit, with the value each was last set to.
    pub fn changed(&self) -> &Values {
        &self.changed
    }

    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    /// True iff no attribute currently has a recorded error, changed or not.
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn errors(&self) -> Errors {
        self.validation.errors()
    }

    /// True iff `key` currently has a recorded error, whether or not it was touched.
    pub fn has_error(&self, key: &str) -> bool {
        self.validation.has_error(key)
    }

    pub fn id(&self) -> Option<&Value> {
        self.values.get(self.class.id_attribute())
    }

    /// True iff the id attribute was never set.
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Declared attributes that are set, read raw. Explicit `null`s are kept.
    pub fn to_transfer_object(&self) -> Values {
        self.class
            .schema()
            .keys()
            .filter_map(|key| Some((key.to_owned(), self.values.get(key)?.clone())))
            .collect()
    }

    /// The resource URL of this instance: the collection URL when new, the member URL otherwise.
    pub fn url(&self) -> String {
        self.class.routes().url_for(self)
    }

    // --- Lifecycle ---

    /// Shallow-merges `values`, then commits.
    pub fn parse(&mut self, values: Values) {
        for (key, value) in values {
            self.values.insert(key, value);
        }
        self.reset();
    }

    /// Commits the current values as the last known state. Does not re-validate.
    pub fn reset(&mut self) {
        self.changed.clear();
        self.previous_values = self.values.clone();
        self.validation.commit();
        self.pristine = true;
    }

    /// Discards pending edits and restores the last committed values.
    pub fn clear(&mut self) {
        self.changed.clear();
        self.values = self.previous_values.clone();
        self.validation.commit();
        self.pristine = true;
    }

    /// Waits for every validation spawned by [`Model::set`].
    pub async fn settle(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Validation task failed");
            }
        }
    }

    // --- Validation ---

    fn check(&self, key: &str) -> ValidationOutcome {
        match self.class.schema().attribute(key) {
            Some(attribute) => attribute.check(&self.get(key)),
            None => ValidationOutcome::Valid,
        }
    }

    /// Validates one attribute against its current value.
    ///
    /// The validator is invoked immediately; the returned future settles and applies it.
    pub fn validate_attribute(&self, key: &str) -> BoxFuture<'static, Result<(), ValidationFailure>> {
        self.validation.validate(key, self.check(key))
    }

    /// Validates every declared attribute concurrently, waiting for all of them.
    pub async fn validate_all(&self) -> Result<(), AggregateValidationFailure> {
        let checks = self
            .class
            .schema()
            .keys()
            .map(|key| (key.to_owned(), self.check(key)))
            .collect();
        self.validation.validate_all(checks).await
    }

    /// Validates one declared attribute, or all of them when `key` is `None`.
    pub async fn validate(&self, key: Option<&str>) -> Result<(), ModelError> {
        match key {
            Some(key) if !self.class.schema().is_declared(key) => {
                Err(ModelError::UnknownAttribute(key.to_owned()))
            }
            Some(key) => Ok(self.validate_attribute(key).await?),
            None => Ok(self.validate_all().await?),
        }
    }

    // --- Remote ---

    /// Loads the remote state of this instance and parses it in.
    #[instrument(skip(self), fields(resource = self.class.base_url()))]
    pub async fn fetch(&mut self) -> Result<&mut Self, ModelError> {
        let store = self.class.store();
        let response = store.fetch(self).await.inspect_err(|e| {
            warn!(error = %e, "Fetch failed");
        })?;
        self.parse(response);
        info!(id = ?self.id(), "Fetched");
        Ok(self)
    }

    /// Validates every attribute, then creates or updates the remote resource.
    ///
    /// No store call is made while the instance is invalid.
    #[instrument(skip(self), fields(resource = self.class.base_url()))]
    pub async fn save(&mut self) -> Result<&mut Self, ModelError> {
        self.validate_all().await?;

        let store = self.class.store();
        let response = if self.is_new() {
            debug!("Creating");
            store.create(self).await
        } else {
            debug!(id = ?self.id(), "Updating");
            store.update(self).await
        };
        let response = response.inspect_err(|e| warn!(error = %e, "Save failed"))?;

        self.parse(response);
        info!(id = ?self.id(), "Saved");
        Ok(self)
    }

    /// Deletes the remote resource. The instance itself is left as it was.
    #[instrument(skip(self), fields(resource = self.class.base_url()))]
    pub async fn destroy(&self) -> Result<(), ModelError> {
        self.class
            .store()
            .delete(self)
            .await
            .inspect_err(|e| warn!(error = %e, "Delete failed"))?;
        info!(id = ?self.id(), "Deleted");
        Ok(())
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("resource", &self.class.base_url())
            .field("values", &self.values)
            .field("pristine", &self.pristine)
            .field("errors", &self.errors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockStore;
    use crate::{Attribute, ModelClass, ModelSchema, ValidationOutcome};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn values(value: Value) -> super::Values {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn car_class() -> ModelClass {
        let schema = ModelSchema::builder()
            .attribute(Attribute::new("name").with_validator(|name: &Value| {
                match name.as_str().map(str::trim) {
                    Some(name) if !name.is_empty() => ValidationOutcome::Valid,
                    _ => ValidationOutcome::invalid("Name is required"),
                }
            }))
            .attribute(Attribute::new("color"))
            .attribute(Attribute::new("id"))
            .base_url("/cars")
            .build();
        ModelClass::extend(schema, MockStore::new())
    }

    #[test]
    fn test_construction_reads_unset_keys_as_null() {
        let car = car_class().new_instance(values(json!({"name": "Super Car!", "id": 1})));
        assert!(car.is_pristine());
        assert!(car.is_valid());
        assert_eq!(car.values().len(), 2);
        assert!(!car.is_set("color"));
        assert_eq!(car.get("color"), Value::Null);
        assert_eq!(car.previous_values(), car.values());
    }

    #[test]
    fn test_explicit_null_is_kept_in_transfer_object() {
        let mut car = car_class().new_instance(values(json!({"id": 1, "name": "Car", "color": "red"})));
        car.set("color", Value::Null);

        assert!(car.is_set("color"));
        assert_eq!(
            Value::Object(car.to_transfer_object()),
            json!({"id": 1, "name": "Car", "color": null})
        );

        car.clear();
        assert_eq!(car.get("color"), json!("red"));
    }

    #[test]
    fn test_dirty_tracking_reset_and_clear() {
        let mut car = car_class().new_instance(values(json!({"name": "Super Car!", "id": 1})));

        car.set_attribute("name", "New value");
        assert!(!car.is_pristine());
        assert_eq!(car.changed()["name"], json!("New value"));

        car.reset();
        assert!(car.is_pristine());
        assert_eq!(car.attribute("name"), json!("New value"));
        assert!(car.changed().is_empty());

        car.set_attribute("name", "Another value");
        car.clear();
        assert!(car.is_pristine());
        assert_eq!(car.attribute("name"), json!("New value"));
    }

    #[test]
    fn test_sync_validation_on_set() {
        let mut car = car_class().new_instance(values(json!({"name": "Car", "id": 1})));

        car.set_attribute("name", "  ");
        assert_eq!(car.errors()["name"], json!("Name is required"));
        assert!(!car.is_valid());
        assert!(car.has_error("name"));

        car.set_attribute("name", "Car");
        assert!(!car.has_error("name"));
        assert!(car.is_valid());
    }

    #[test]
    fn test_reset_and_clear_drop_errors() {
        let mut car = car_class().new_instance(values(json!({"name": "Car"})));
        car.set_attribute("name", "");
        assert!(!car.is_valid());

        car.clear();
        assert!(car.errors().is_empty());
        assert!(car.is_valid());
        assert_eq!(car.attribute("name"), json!("Car"));
    }

    #[test]
    fn test_custom_getter_and_setter() {
        let schema = ModelSchema::builder()
            .attribute(
                Attribute::new("name")
                    .with_getter(|super_get| {
                        format!("+{}+", super_get().as_str().unwrap_or_default())
                    })
                    .with_setter(|value, super_set| match value {
                        Value::String(s) => super_set(json!(s.trim())),
                        other => super_set(other),
                    }),
            )
            .build();
        let class = ModelClass::extend(schema, MockStore::new());
        let mut model = class.new_instance(values(json!({"name": "Car"})));

        assert_eq!(model.attribute("name"), json!("+Car+"));
        assert_eq!(model.get("name"), json!("Car"));

        model.set_attribute("name", "  Trimmed  ");
        assert_eq!(model.get("name"), json!("Trimmed"));
        assert!(!model.is_pristine());
    }

    #[test]
    fn test_identity_and_transfer_object() {
        let class = car_class();
        assert!(class.new_instance(values(json!({}))).is_new());

        let car = class.new_instance(values(json!({"id": 1, "name": "Car", "extra": "ignored"})));
        assert!(!car.is_new());
        assert_eq!(car.id(), Some(&json!(1)));
        assert_eq!(car.get_as::<u64>("id"), Some(1));
        assert_eq!(
            Value::Object(car.to_transfer_object()),
            json!({"id": 1, "name": "Car"})
        );
        assert_eq!(car.url(), "/cars/1");
    }

    #[test]
    fn test_custom_id_attribute() {
        let schema = ModelSchema::builder()
            .attributes(["name", "color"])
            .id_attribute("name")
            .build();
        let class = ModelClass::extend(schema, MockStore::new());
        let car = class.new_instance(values(json!({"name": "Super Car!"})));
        assert_eq!(car.id(), Some(&json!("Super Car!")));
    }

    #[tokio::test]
    async fn test_validate_unknown_attribute() {
        let car = car_class().new_instance(values(json!({"name": "Car"})));
        let err = car.validate(Some("wheels")).await.unwrap_err();
        assert!(matches!(err, crate::ModelError::UnknownAttribute(key) if key == "wheels"));

        car.validate(Some("color")).await.unwrap();
        assert!(car.is_valid());
    }

    #[tokio::test]
    async fn test_async_validation_from_setter_settles() {
        let schema = ModelSchema::builder()
            .attribute(Attribute::new("email").with_async_validator(|email: Value| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                match email.as_str() {
                    Some(email) if email.contains('@') => Ok(()),
                    _ => Err("Invalid email".to_owned()),
                }
            }))
            .build();
        let class = ModelClass::extend(schema, MockStore::new());
        let mut user = class.new_instance(values(json!({})));

        user.set_attribute("email", "nope");
        assert!(user.is_valid(), "pending validation has not completed yet");

        user.settle().await;
        assert_eq!(user.errors()["email"], json!("Invalid email"));
        assert!(!user.is_valid());
    }
}
