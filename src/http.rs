//! # HTTP Store
//!
//! [`HttpStore`] maps the [`RemoteStore`] contract onto REST requests against a model type's
//! [`ResourceRoutes`]:
//!
//! | Operation | Method   | URL        | Body            |
//! |-----------|----------|------------|-----------------|
//! | create    | `POST`   | index      | transfer object |
//! | update    | `PUT`    | member     | transfer object |
//! | fetch     | `GET`    | member     |                 |
//! | delete    | `DELETE` | member     |                 |
//! | list      | `GET`    | index      | (criteria as query params) |
//!
//! Sending the request is delegated to a [`Transport`], so any HTTP client can be plugged in.

use crate::error::TransportError;
use crate::model::{Model, Values};
use crate::routes::ResourceRoutes;
use crate::schema::ModelSchema;
use crate::store::{expect_object, RemoteStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request built by [`HttpStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    #[serde(default, skip_serializing_if = "Values::is_empty")]
    pub params: Values,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Values>,
}

impl HttpRequest {
    fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            params: Values::new(),
            body: None,
        }
    }
}

/// Sends a request and returns the decoded response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Value, TransportError>;
}

/// A [`RemoteStore`] speaking REST through a [`Transport`].
pub struct HttpStore<T> {
    routes: ResourceRoutes,
    transport: T,
}

impl<T: Transport> HttpStore<T> {
    pub fn new(schema: &ModelSchema, transport: T) -> Self {
        Self {
            routes: ResourceRoutes::new(schema.base_url(), schema.id_attribute()),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, request: HttpRequest) -> Result<Value, TransportError> {
        debug!(method = ?request.method, url = %request.url, "Sending");
        self.transport.send(request).await
    }
}

#[async_trait]
impl<T: Transport> RemoteStore for HttpStore<T> {
    async fn create(&self, model: &Model) -> Result<Values, TransportError> {
        let mut request = HttpRequest::new(Method::Post, self.routes.url_for(model));
        request.body = Some(model.to_transfer_object());
        expect_object(self.send(request).await?)
    }

    async fn update(&self, model: &Model) -> Result<Values, TransportError> {
        let mut request = HttpRequest::new(Method::Put, self.routes.url_for(model));
        request.body = Some(model.to_transfer_object());
        expect_object(self.send(request).await?)
    }

    async fn fetch(&self, model: &Model) -> Result<Values, TransportError> {
        let request = HttpRequest::new(Method::Get, self.routes.url_for(model));
        expect_object(self.send(request).await?)
    }

    async fn list(&self, criteria: &Values) -> Result<Value, TransportError> {
        let mut request = HttpRequest::new(Method::Get, self.routes.index_url(criteria));
        request.params = self.routes.query_params(criteria);
        self.send(request).await
    }

    async fn delete(&self, model: &Model) -> Result<(), TransportError> {
        let request = HttpRequest::new(Method::Delete, self.routes.url_for(model));
        self.send(request).await?;
        Ok(())
    }
}
