//! Core traits and types for document representation and serialization.
//!
//! This module provides the fundamental trait that all remotely stored
//! documents must implement, as well as utilities for converting documents
//! to and from their JSON wire form.

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::StoreResult;

/// Core trait that all documents reachable through a data context must
/// implement.
///
/// This trait defines the minimal interface required for a type to be used
/// as a document. Every document has a string identifier (the `_id` field on
/// the wire) and a type tag (the `_type` discriminator the remote stores in
/// every document).
///
/// # Deriving with `#[derive]`
///
/// While `Document` cannot be automatically derived, you can derive its
/// super-traits:
/// - `Serialize` (from serde)
/// - `Deserialize` (from serde)
/// - `Clone`
/// - `Debug`
///
/// # Example
///
/// ```ignore
/// use docstage::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Article {
///     #[serde(rename = "_id")]
///     pub id: String,
///     pub title: String,
/// }
///
/// impl Document for Article {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn document_type() -> &'static str {
///         "article"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns this document's identifier.
    fn id(&self) -> &str;

    /// Returns the type tag documents of this type carry on the remote.
    ///
    /// This should be a static, lowercase identifier (e.g., "article",
    /// "author"). It keys the per-type document sets and partitions staged
    /// mutations.
    fn document_type() -> &'static str;
}

/// Extension trait providing serialization/deserialization utilities for
/// documents.
///
/// This trait is automatically implemented for all types that implement
/// [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> StoreResult<Value>;

    /// Creates a document from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_json(value: Value) -> StoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_json(&self) -> StoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> StoreResult<Self> {
        Ok(from_value(value)?)
    }
}

/// A reference field pointing at another document by identifier.
///
/// Serializes to the remote's reference shape (`{"_ref": "..."}`, with an
/// optional `_weak` marker for references that may dangle). Embed it in
/// document types wherever a field refers to another document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Identifier of the referenced document.
    #[serde(rename = "_ref")]
    pub id: String,
    /// Weak references are allowed to point at documents that do not exist.
    #[serde(rename = "_weak", skip_serializing_if = "Option::is_none")]
    pub weak: Option<bool>,
}

impl Reference {
    /// Creates a strong reference to the given document id.
    pub fn to(id: impl Into<String>) -> Self {
        Self { id: id.into(), weak: None }
    }

    /// Creates a weak reference to the given document id.
    pub fn weak(id: impl Into<String>) -> Self {
        Self { id: id.into(), weak: Some(true) }
    }
}
