//! # Collections
//!
//! An ordered container of [`Model`]s of one [`ModelClass`], built from list responses.

use crate::class::ModelClass;
use crate::error::ModelError;
use crate::model::{Model, Values};
use serde_json::Value;
use std::fmt;
use std::ops::Index;
use std::slice;

pub struct Collection {
    class: ModelClass,
    items: Vec<Model>,
}

impl Collection {
    pub fn new(class: ModelClass) -> Self {
        Self {
            class,
            items: Vec::new(),
        }
    }

    /// A collection parsed from `data`.
    pub async fn with_data(class: ModelClass, data: Value) -> Result<Self, ModelError> {
        let mut collection = Self::new(class);
        collection.parse(data).await?;
        Ok(collection)
    }

    pub fn class(&self) -> &ModelClass {
        &self.class
    }

    /// Truncates to empty.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, model: Model) {
        self.items.push(model);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Model> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Model> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Model> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, Model> {
        self.items.iter_mut()
    }

    /// Replaces the contents with one instance per row of `data`, in input order.
    ///
    /// `data` first goes through the schema's `parse_list` hook, if any. The (possibly
    /// unwrapped) data must be an array of objects; otherwise the current contents are kept
    /// and [`ModelError::MalformedList`] is returned.
    pub async fn parse(&mut self, data: Value) -> Result<(), ModelError> {
        let data = match self.class.schema().list_parser() {
            Some(parse_list) => parse_list(data).await,
            None => data,
        };

        let rows = match data {
            Value::Array(rows) => rows,
            other => {
                return Err(ModelError::MalformedList(format!(
                    "expected an array, got {}",
                    kind(&other)
                )))
            }
        };
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| match row {
                Value::Object(values) => Ok(values),
                other => Err(ModelError::MalformedList(format!(
                    "row {index} is {}, expected an object",
                    kind(&other)
                ))),
            })
            .collect::<Result<Vec<Values>, _>>()?;

        self.clear();
        for values in rows {
            let model = self.class.new_instance(values);
            self.items.push(model);
        }
        Ok(())
    }

    /// The transfer object of every instance, in order.
    pub fn to_transfer_objects(&self) -> Vec<Values> {
        self.items.iter().map(Model::to_transfer_object).collect()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Index<usize> for Collection {
    type Output = Model;

    fn index(&self, index: usize) -> &Model {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Model;
    type IntoIter = slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Collection {
    type Item = Model;
    type IntoIter = std::vec::IntoIter<Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStore;
    use crate::ModelSchema;
    use serde_json::json;
    use std::time::Duration;

    fn cars(schema: ModelSchema) -> ModelClass {
        ModelClass::extend(schema, MockStore::new())
    }

    #[tokio::test]
    async fn test_parse_round_trip() {
        let class = cars(ModelSchema::builder().attributes(["id", "name"]).build());
        let data = json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]);

        let collection = Collection::with_data(class, data.clone()).await.unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection[0].get("name"), json!("A"));
        assert_eq!(collection[1].get("name"), json!("B"));

        let round_trip: Vec<Value> = collection
            .to_transfer_objects()
            .into_iter()
            .map(Value::Object)
            .collect();
        assert_eq!(Value::Array(round_trip), data);
    }

    #[tokio::test]
    async fn test_parse_list_unwraps_envelope_asynchronously() {
        let schema = ModelSchema::builder()
            .attributes(["id"])
            .parse_list_async(|mut response: Value| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                response["data"].take()
            })
            .build();
        let mut collection = Collection::new(cars(schema));
        collection.parse(json!({"data": [{"id": 1}]})).await.unwrap();
        collection.parse(json!({"data": [{"id": 2}, {"id": 3}]})).await.unwrap();

        let ids: Vec<Value> = collection.iter().map(|m| m.get("id")).collect();
        assert_eq!(ids, [json!(2), json!(3)]);
    }

    #[tokio::test]
    async fn test_malformed_rows_keep_contents() {
        let class = cars(ModelSchema::builder().attributes(["id"]).build());
        let mut collection = Collection::with_data(class, json!([{"id": 1}])).await.unwrap();

        let err = collection.parse(json!([{"id": 2}, 3])).await.unwrap_err();
        assert!(matches!(err, ModelError::MalformedList(_)));
        assert_eq!(collection.len(), 1);

        let err = collection.parse(json!({"id": 2})).await.unwrap_err();
        assert!(matches!(err, ModelError::MalformedList(_)));
    }
}
