//! # Resource Model
//!
//! > **Schema-driven client-side models for remote resources.**
//!
//! A model type is declared once as a [`ModelSchema`] (its attributes, their custom
//! getters/setters/validators, the id attribute and the resource base URL) and turned into a
//! [`ModelClass`] bound to a [`RemoteStore`]. Instances ([`Model`]) track their changes since the
//! last commit point, validate every write, and refuse to save while invalid.
//!
//! ## 🏗️ Core Concepts
//!
//! ### Raw values and accessors
//! Every attribute value is a [`serde_json::Value`]; `null` means unset. Reads and writes go
//! either through the raw paths ([`Model::get`], [`Model::set`]) or through the attribute's
//! accessors ([`Model::attribute`], [`Model::set_attribute`]), which receive the raw paths as a
//! callback and decorate them.
//!
//! ### Validation
//! Validators may answer immediately or return a future ([`ValidationOutcome::Pending`]).
//! Validations triggered by writes run in the background; [`Model::save`] and
//! [`Model::validate_all`] wait for every attribute to settle and report all failures at once.
//! A completion that was superseded by a newer write, or by a commit, is discarded.
//!
//! ### Stores
//! [`RemoteStore`] is the only seam to the outside world. The crate ships three bindings:
//! - [`http::HttpStore`]: builds REST requests from [`routes::ResourceRoutes`] and hands them to a
//!   pluggable [`http::Transport`].
//! - [`memory::StoreActor`]: an in-process actor owning rows, reached through a cloneable
//!   [`memory::StoreClient`].
//! - [`mock::MockStore`]: scripted expectations for tests.
//!
//! ## 🗺️ Module Tour
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Attribute and model-type declarations |
//! | [`validation`] | Outcome normalization and the per-instance validation state |
//! | [`model`] | Instance lifecycle: dirty tracking, commit points, save/fetch/destroy |
//! | [`class`] | Model types: construction, `all`, `find`, `filter` |
//! | [`collection`] | Ordered lists of instances parsed from list responses |
//! | [`store`] | The remote store contract |
//! | [`routes`] | URL templates and index/member routes |
//! | [`http`], [`memory`], [`mock`] | Store bindings |
//! | [`tracing`](mod@tracing) | Subscriber setup |
//! | [`error`] | Error types |
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod class;
pub mod collection;
pub mod error;
pub mod http;
mod macros;
pub mod memory;
pub mod mock;
pub mod model;
pub mod routes;
pub mod schema;
pub mod store;
pub mod tracing;
pub mod validation;

#[doc(hidden)]
pub use paste as __paste;

// Re-export core types for convenience
pub use class::ModelClass;
pub use collection::Collection;
pub use error::{AggregateValidationFailure, Errors, ModelError, TransportError, ValidationFailure};
pub use model::{Model, Values};
pub use schema::{Attribute, ModelSchema, ModelSchemaBuilder};
pub use serde_json::{Map, Value};
pub use store::RemoteStore;
pub use validation::{ValidationEngine, ValidationOutcome};
