//! Roster Store is a console-driven roster manager.
//!
//! It keeps people-like records (students, courses) in memory, validates every
//! attribute against a per-kind schema before mutation and issues identifiers
//! from a small persistent counter file that survives process restarts.
//!
//! ## Core Components
//! - [`engine`]: The identifier allocator and the generic sequential record store.
//! - [`model`]: Attribute values, validators, schemas and the entity kinds.
//! - [`roster`]: A facade bundling the allocator with one store per entity kind.
//! - [`console`]: The interactive text menu and its report formatting.

pub mod console;
pub mod engine;
pub mod model;
pub mod roster;

use std::fmt;
use thiserror::Error;

use crate::model::{Record, Schema};

/// Errors returned by the roster store.
///
/// Validation and lookup failures are ordinary values: their `Display` output
/// is the message shown to the operator.
#[derive(Error, Debug)]
pub enum Error {
    /// The attribute name is not declared by the entity's schema.
    #[error("{0} is not a valid attribute.")]
    InvalidAttribute(String),
    /// The attribute value failed its validator.
    #[error("{value} is an invalid {label}.")]
    InvalidValue {
        attr: String,
        label: String,
        value: String,
    },
    /// A required attribute was not supplied on creation.
    #[error("{0} is required.")]
    MissingAttribute(String),
    /// The store holds no records.
    #[error("List is empty.")]
    EmptyList,
    /// The index does not address a stored record.
    #[error("Index--{0} out of list.")]
    IndexOutOfRange(usize),
    /// No record matched a key-value lookup.
    #[error("{kind} with {key}={value} not found.")]
    NotFound {
        kind: String,
        key: String,
        value: String,
    },
    /// The counter has handed out every identifier it can represent.
    #[error("Counter {0} is exhausted.")]
    CounterExhausted(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred while touching the counter file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for roster store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Issues identifiers that are never reused for a given counter name.
pub trait IdAllocator: Send + Sync {
    /// Returns the next identifier for `counter`, starting at 1.
    ///
    /// Fails only when the counter cannot advance any further.
    fn next_id(&self, counter: &str) -> Result<u64>;
}

/// A record kind that can live in a [`engine::SqList`].
///
/// Implementors wrap a [`Record`] and point at the static [`Schema`] that
/// governs which attributes it may carry.
pub trait Entity: fmt::Display {
    /// The schema shared by every entity of this kind.
    fn schema() -> &'static Schema
    where
        Self: Sized;

    /// Read access to the underlying attribute mapping.
    fn record(&self) -> &Record;

    /// Write access to the underlying attribute mapping.
    fn record_mut(&mut self) -> &mut Record;

    /// The store-internal identifier assigned at creation.
    fn id(&self) -> u64 {
        self.record().id()
    }
}
