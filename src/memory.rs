//! # In-Memory Store
//!
//! An actor-backed [`RemoteStore`]. [`StoreActor`] owns the rows and processes requests
//! sequentially on its own task; [`StoreClient`] is the cloneable handle that sends them over
//! an mpsc channel and awaits the oneshot reply.
//!
//! ```rust
//! use resource_model::memory::StoreActor;
//! use resource_model::{ModelClass, ModelSchema};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StoreActor::new(16, "id");
//!     tokio::spawn(actor.run());
//!
//!     let schema = ModelSchema::builder().attributes(["id", "name"]).base_url("/cars").build();
//!     let cars = ModelClass::extend(schema, client);
//!
//!     let mut car = cars.new_instance(Default::default());
//!     car.set("name", "Super Car!");
//!     car.save().await.unwrap();
//!     assert_eq!(car.get("id"), 1);
//! }
//! ```
//!
//! Rows are keyed by the string form of their id. Ids missing on create are assigned from a
//! counter starting at 1, skipping ids already taken; creating a row whose explicit id exists
//! fails with [`TransportError::Conflict`]. `list` returns every row whose fields equal all
//! criteria fields.

use crate::error::TransportError;
use crate::model::{Model, Values};
use crate::store::RemoteStore;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub type Response<T> = oneshot::Sender<Result<T, TransportError>>;

/// Requests processed by a [`StoreActor`].
#[derive(Debug)]
pub enum StoreRequest {
    Create {
        row: Values,
        respond_to: Response<Values>,
    },
    Fetch {
        id: Value,
        respond_to: Response<Values>,
    },
    Update {
        id: Value,
        row: Values,
        respond_to: Response<Values>,
    },
    Delete {
        id: Value,
        respond_to: Response<()>,
    },
    List {
        criteria: Values,
        respond_to: Response<Value>,
    },
}

/// Owns the rows of one resource.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    rows: IndexMap<String, Values>,
    id_attribute: String,
    next_id: u64,
}

fn row_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl StoreActor {
    /// Creates the actor and its client. `buffer_size` is the channel capacity.
    pub fn new(buffer_size: usize, id_attribute: &str) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            rows: IndexMap::new(),
            id_attribute: id_attribute.to_owned(),
            next_id: 1,
        };
        (actor, StoreClient { sender })
    }

    /// The next counter value not already taken by an explicitly inserted row.
    fn generate_id(&mut self) -> Value {
        while self.rows.contains_key(&self.next_id.to_string()) {
            self.next_id += 1;
        }
        let id = Value::from(self.next_id);
        self.next_id += 1;
        id
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        info!(id_attribute = %self.id_attribute, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Create { mut row, respond_to } => {
                    let id = match row.get(&self.id_attribute) {
                        Some(id) if !id.is_null() => id.clone(),
                        _ => {
                            let id = self.generate_id();
                            row.insert(self.id_attribute.clone(), id.clone());
                            id
                        }
                    };
                    if self.rows.contains_key(&row_key(&id)) {
                        warn!(%id, "Already exists");
                        let _ = respond_to.send(Err(TransportError::Conflict(row_key(&id))));
                        continue;
                    }
                    self.rows.insert(row_key(&id), row.clone());
                    info!(%id, size = self.rows.len(), "Created");
                    let _ = respond_to.send(Ok(row));
                }
                StoreRequest::Fetch { id, respond_to } => {
                    let row = self.rows.get(&row_key(&id)).cloned();
                    debug!(%id, found = row.is_some(), "Fetch");
                    let _ = respond_to.send(row.ok_or_else(|| TransportError::NotFound(row_key(&id))));
                }
                StoreRequest::Update {
                    id,
                    row,
                    respond_to,
                } => {
                    debug!(%id, "Update");
                    if let Some(stored) = self.rows.get_mut(&row_key(&id)) {
                        for (key, value) in row {
                            stored.insert(key, value);
                        }
                        info!(%id, "Updated");
                        let _ = respond_to.send(Ok(stored.clone()));
                    } else {
                        warn!(%id, "Not found");
                        let _ = respond_to.send(Err(TransportError::NotFound(row_key(&id))));
                    }
                }
                StoreRequest::Delete { id, respond_to } => {
                    debug!(%id, "Delete");
                    if self.rows.shift_remove(&row_key(&id)).is_some() {
                        info!(%id, size = self.rows.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(%id, "Not found");
                        let _ = respond_to.send(Err(TransportError::NotFound(row_key(&id))));
                    }
                }
                StoreRequest::List {
                    criteria,
                    respond_to,
                } => {
                    let rows: Vec<Value> = self
                        .rows
                        .values()
                        .filter(|row| {
                            criteria
                                .iter()
                                .all(|(key, expected)| row.get(key) == Some(expected))
                        })
                        .cloned()
                        .map(Value::Object)
                        .collect();
                    debug!(?criteria, count = rows.len(), "List");
                    let _ = respond_to.send(Ok(Value::Array(rows)));
                }
            }
        }

        info!(size = self.rows.len(), "Shutdown");
    }
}

/// Cloneable handle to a [`StoreActor`].
#[derive(Debug, Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    async fn request<T>(
        &self,
        make: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, TransportError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| TransportError::Closed)?;
        response.await.map_err(|_| TransportError::Dropped)?
    }

    /// Stores a row directly, bypassing any model. Returns the stored row.
    pub async fn insert(&self, row: Values) -> Result<Values, TransportError> {
        self.request(|respond_to| StoreRequest::Create { row, respond_to })
            .await
    }

    fn id_of(model: &Model) -> Result<Value, TransportError> {
        model
            .id()
            .cloned()
            .ok_or_else(|| TransportError::NotFound("instance has no id".to_owned()))
    }
}

#[async_trait]
impl RemoteStore for StoreClient {
    async fn create(&self, model: &Model) -> Result<Values, TransportError> {
        self.insert(model.to_transfer_object()).await
    }

    async fn update(&self, model: &Model) -> Result<Values, TransportError> {
        let id = Self::id_of(model)?;
        let row = model.to_transfer_object();
        self.request(|respond_to| StoreRequest::Update {
            id,
            row,
            respond_to,
        })
        .await
    }

    async fn fetch(&self, model: &Model) -> Result<Values, TransportError> {
        let id = Self::id_of(model)?;
        self.request(|respond_to| StoreRequest::Fetch { id, respond_to })
            .await
    }

    async fn list(&self, criteria: &Values) -> Result<Value, TransportError> {
        let criteria = criteria.clone();
        self.request(|respond_to| StoreRequest::List {
            criteria,
            respond_to,
        })
        .await
    }

    async fn delete(&self, model: &Model) -> Result<(), TransportError> {
        let id = Self::id_of(model)?;
        self.request(|respond_to| StoreRequest::Delete { id, respond_to })
            .await
    }
}
