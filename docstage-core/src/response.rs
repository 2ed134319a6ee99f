//! Remote acknowledgement types for committed mutation batches.
//!
//! A commit returns one [`MutationResponse`] covering the whole batch in
//! submission order. The per-type commit path narrows it to a
//! [`TypedMutationResponse`] so returned document snapshots come back as
//! the caller's document type instead of raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    document::{Document, DocumentExt},
    error::StoreResult,
};

/// Acknowledgement of one operation within a committed batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationResult {
    /// Identifier the operation applied to (generated by the remote for
    /// creates without an id, when id return was requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// What the remote did: "create", "update", or "delete".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Snapshot of the resulting document, when document return was
    /// requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
}

/// The remote service's acknowledgement of a committed mutation batch.
///
/// `Default` is the empty/no-op response a full commit returns when nothing
/// was staged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    /// Transaction identifier assigned by the remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Per-operation results in submission order.
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

impl MutationResponse {
    /// Identifiers reported back, in submission order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter_map(|result| result.id.as_deref())
    }

    /// Returned document snapshots, in submission order.
    pub fn documents(&self) -> impl Iterator<Item = &Value> {
        self.results
            .iter()
            .filter_map(|result| result.document.as_ref())
    }

    /// Narrows the response to one document type, materializing returned
    /// snapshots as `D`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a returned snapshot does not
    /// deserialize as `D`.
    pub fn into_typed<D: Document>(self) -> StoreResult<TypedMutationResponse<D>> {
        Ok(TypedMutationResponse {
            transaction_id: self.transaction_id,
            results: self
                .results
                .into_iter()
                .map(|result| {
                    Ok(TypedMutationResult {
                        id: result.id,
                        operation: result.operation,
                        document: result
                            .document
                            .map(D::from_json)
                            .transpose()?,
                    })
                })
                .collect::<StoreResult<Vec<_>>>()?,
        })
    }
}

/// Acknowledgement of one operation, narrowed to document type `D`.
#[derive(Debug, Clone)]
pub struct TypedMutationResult<D: Document> {
    /// Identifier the operation applied to.
    pub id: Option<String>,
    /// What the remote did: "create", "update", or "delete".
    pub operation: Option<String>,
    /// Snapshot of the resulting document, materialized as `D`.
    pub document: Option<D>,
}

/// A [`MutationResponse`] narrowed to one document type.
#[derive(Debug, Clone)]
pub struct TypedMutationResponse<D: Document> {
    /// Transaction identifier assigned by the remote.
    pub transaction_id: Option<String>,
    /// Per-operation results in submission order.
    pub results: Vec<TypedMutationResult<D>>,
}

impl<D: Document> TypedMutationResponse<D> {
    /// Returned document snapshots, in submission order.
    pub fn documents(&self) -> impl Iterator<Item = &D> {
        self.results
            .iter()
            .filter_map(|result| result.document.as_ref())
    }
}
