//! Error types and result types for data context operations.
//!
//! This module provides error handling for every fallible operation in the
//! crate. Use [`StoreResult<T>`] as the return type for fallible operations.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working with a data
/// context and its remote document store.
///
/// This enum covers serialization errors, construction-time configuration
/// problems, the empty-batch commit guard, and remote-side failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting documents or
    /// payloads to and from JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Missing or invalid construction options. Raised synchronously,
    /// before any network activity.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A per-type commit was requested while zero mutations were staged for
    /// that document type. No remote call is made.
    #[error("No pending changes for document type {0}")]
    NoPendingChanges(String),
    /// A create mutation targeted an identifier that already exists.
    #[error("Document {0} already exists")]
    DocumentAlreadyExists(String),
    /// A patch targeted a document that does not exist.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    /// The document body is structurally unusable (e.g. not a JSON object,
    /// or missing a required identifier).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A transport, authentication, or service-side failure reported by the
    /// remote client. Surfaced unchanged; never retried here.
    #[error("Remote error: {0}")]
    Remote(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for data context operations.
///
/// This type alias is used throughout the crate to indicate operations that
/// may fail with a [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
