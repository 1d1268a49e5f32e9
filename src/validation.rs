//! # Validation Engine
//!
//! Validators return a [`ValidationOutcome`]: valid, invalid with a message, or a pending
//! future resolving to one of those. [`ValidationOutcome::resolve`] normalizes all three into
//! `Result<(), Value>`.
//!
//! The [`ValidationEngine`] owns a model's aggregate validation state (the error map and the
//! validity flag) behind an `Arc<Mutex<_>>`, so completions of validations running as
//! independent tasks can update it after the setter that scheduled them has returned.
//!
//! ## Completion ordering
//!
//! Every validation is issued a ticket carrying a per-key generation and the engine's commit
//! epoch. A completion only writes `errors[key]` when its ticket is still the newest for that
//! key and no commit happened since it was issued. Stale completions are discarded; the
//! validity flag is recomputed on every completion regardless.

use crate::error::{AggregateValidationFailure, Errors, ValidationFailure};
use futures_util::future::{join_all, BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// The result of invoking a validator.
pub enum ValidationOutcome {
    Valid,
    /// Carries the failure message: a string or a structured payload.
    Invalid(Value),
    Pending(BoxFuture<'static, ValidationOutcome>),
}

impl ValidationOutcome {
    pub fn invalid(message: impl Into<Value>) -> Self {
        Self::Invalid(message.into())
    }

    /// `true` is the success marker. Any other value is the failure message.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Bool(true) => Self::Valid,
            other => Self::Invalid(other),
        }
    }

    pub fn pending<F, O>(future: F) -> Self
    where
        F: Future<Output = O> + Send + 'static,
        O: Into<ValidationOutcome>,
    {
        Self::Pending(future.map(|outcome| outcome.into()).boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Awaits pending outcomes until a final verdict is reached.
    pub async fn resolve(self) -> Result<(), Value> {
        let mut outcome = self;
        loop {
            match outcome {
                Self::Valid => return Ok(()),
                Self::Invalid(message) => return Err(message),
                Self::Pending(future) => outcome = future.await,
            }
        }
    }
}

impl fmt::Debug for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "Valid"),
            Self::Invalid(message) => f.debug_tuple("Invalid").field(message).finish(),
            Self::Pending(_) => write!(f, "Pending"),
        }
    }
}

impl From<bool> for ValidationOutcome {
    fn from(valid: bool) -> Self {
        Self::from_value(Value::Bool(valid))
    }
}

impl From<Value> for ValidationOutcome {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Result<(), String>> for ValidationOutcome {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::Valid,
            Err(message) => Self::Invalid(Value::String(message)),
        }
    }
}

impl From<Result<(), Value>> for ValidationOutcome {
    fn from(result: Result<(), Value>) -> Self {
        match result {
            Ok(()) => Self::Valid,
            Err(message) => Self::Invalid(message),
        }
    }
}

#[derive(Debug)]
struct State {
    errors: Errors,
    valid: bool,
    epoch: u64,
    generations: HashMap<String, u64>,
}

#[derive(Debug, Clone)]
struct Ticket {
    key: String,
    generation: u64,
    epoch: u64,
}

/// Shared validation state of one model instance.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    state: Arc<Mutex<State>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                errors: Errors::new(),
                valid: true,
                epoch: 0,
                generations: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn errors(&self) -> Errors {
        self.lock().errors.clone()
    }

    pub fn is_valid(&self) -> bool {
        self.lock().valid
    }

    pub fn has_error(&self, key: &str) -> bool {
        self.lock().errors.contains_key(key)
    }

    /// Clears all errors and invalidates every validation still in flight.
    pub fn commit(&self) {
        let mut state = self.lock();
        state.errors.clear();
        state.valid = true;
        state.epoch += 1;
        state.generations.clear();
    }

    fn issue(&self, key: &str) -> Ticket {
        let mut state = self.lock();
        let epoch = state.epoch;
        let generation = state.generations.entry(key.to_owned()).or_insert(0);
        *generation += 1;
        Ticket {
            key: key.to_owned(),
            generation: *generation,
            epoch,
        }
    }

    fn apply(&self, ticket: &Ticket, result: Result<(), Value>) -> Result<(), ValidationFailure> {
        let mut state = self.lock();
        let current = state.epoch == ticket.epoch
            && state.generations.get(&ticket.key) == Some(&ticket.generation);

        if current {
            match &result {
                Ok(()) => {
                    state.errors.remove(&ticket.key);
                }
                Err(message) => {
                    debug!(key = %ticket.key, %message, "Validation failed");
                    state.errors.insert(ticket.key.clone(), message.clone());
                }
            }
        } else {
            debug!(key = %ticket.key, generation = ticket.generation, "Stale validation discarded");
        }
        state.valid = state.errors.is_empty();
        drop(state);

        result.map_err(|message| ValidationFailure {
            key: ticket.key.clone(),
            message,
        })
    }

    /// Validates one attribute. The returned future settles the outcome and applies it.
    pub fn validate(
        &self,
        key: &str,
        outcome: ValidationOutcome,
    ) -> BoxFuture<'static, Result<(), ValidationFailure>> {
        let ticket = self.issue(key);
        let engine = self.clone();
        async move {
            let result = outcome.resolve().await;
            engine.apply(&ticket, result)
        }
        .boxed()
    }

    /// Fire-and-forget validation. Ready outcomes are applied now; pending outcomes are
    /// spawned onto the tokio runtime and the handle is returned.
    ///
    /// # Panics
    ///
    /// Panics if `outcome` is pending and no tokio runtime is running.
    pub fn dispatch(&self, key: &str, outcome: ValidationOutcome) -> Option<JoinHandle<()>> {
        let ticket = self.issue(key);
        match outcome {
            ValidationOutcome::Valid => {
                let _ = self.apply(&ticket, Ok(()));
                None
            }
            ValidationOutcome::Invalid(message) => {
                let _ = self.apply(&ticket, Err(message));
                None
            }
            pending => {
                let engine = self.clone();
                Some(tokio::spawn(async move {
                    let result = pending.resolve().await;
                    let _ = engine.apply(&ticket, result);
                }))
            }
        }
    }

    /// Validates every given attribute concurrently and waits for all of them to settle.
    /// On failure, reports the complete error map, not just the first failure.
    pub async fn validate_all(
        &self,
        checks: Vec<(String, ValidationOutcome)>,
    ) -> Result<(), AggregateValidationFailure> {
        let validations: Vec<_> = checks
            .into_iter()
            .map(|(key, outcome)| self.validate(&key, outcome))
            .collect();
        let results = join_all(validations).await;

        if results.iter().all(Result::is_ok) {
            Ok(())
        } else {
            let errors = self.errors();
            warn!(failed = errors.len(), "Validation failed");
            Err(AggregateValidationFailure { errors })
        }
    }
}
