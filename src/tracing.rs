//! # Observability
//!
//! Every model operation logs through `tracing` with structured fields:
//!
//! - `debug`: each `set`, each validation failure, stale validations discarded, store requests
//! - `info`: successful fetch, save, delete and store mutations
//! - `warn`: whole-model validation failures and transport failures
//!
//! Remote operations (`fetch`, `save`, `destroy`, `all`, `find`, `filter`) open a span carrying
//! the resource base URL.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=debug cargo run
//! RUST_LOG=resource_model::validation=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug`, saving an invalid instance then a valid one shows:
//!
//! ```text
//! DEBUG save{resource="/cars"}: Validation failed key=name message="Name is required"
//! WARN save{resource="/cars"}: Validation failed failed=1
//! DEBUG Set resource="/cars" key=name value="Super Car!"
//! DEBUG save{resource="/cars"}: Creating
//! INFO Created id=1 size=1
//! INFO save{resource="/cars"}: Saved id=Some(Number(1))
//! ```

/// Installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
