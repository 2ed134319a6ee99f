//! In-memory remote client implementation.
//!
//! This module provides a fully functional stand-in for the remote
//! document database: documents live in a HashMap behind an async-aware
//! read-write lock, mutation batches apply transactionally, and queries
//! run through the expression evaluator.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use docstage_core::{
    error::{StoreError, StoreResult},
    mutation::{Mutation, MutationPayload, Patch},
    query::{Query, SortDirection},
    remote::{CommitOptions, RemoteClient, RemoteClientBuilder},
    response::{MutationResponse, MutationResult},
};

use crate::evaluator::{Comparable, DocumentEvaluator};

type DocumentMap = HashMap<String, Value>;

/// Thread-safe in-memory remote client.
///
/// `InMemoryRemote` is cloneable and uses an `Arc`-wrapped internal state,
/// so clones share the same documents. Intended for development and tests;
/// queries scan every document of the requested type.
///
/// # Transactionality
///
/// A mutation batch is applied to a working copy under the write lock and
/// swapped in only when every mutation succeeds, so a failing batch has no
/// visible effect, matching the atomicity contract of the real service.
#[derive(Default, Clone, Debug)]
pub struct InMemoryRemote {
    documents: Arc<RwLock<DocumentMap>>,
}

impl InMemoryRemote {
    /// Creates a new empty in-memory remote.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(DocumentMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryRemote`.
    pub fn builder() -> InMemoryRemoteBuilder {
        InMemoryRemoteBuilder::default()
    }

    /// Number of documents currently stored, across all types.
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

fn require_object(body: Value) -> StoreResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::InvalidDocument(
            "document body must be a JSON object".to_string(),
        )),
    }
}

fn require_id(body: &Map<String, Value>) -> StoreResult<String> {
    body.get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::InvalidDocument("document is missing _id".to_string()))
}

fn ack(
    operation: &str,
    id: String,
    document: Option<&Value>,
    options: &CommitOptions,
) -> MutationResult {
    MutationResult {
        id: options.return_ids.then_some(id),
        operation: Some(operation.to_string()),
        document: if options.return_documents {
            document.cloned()
        } else {
            None
        },
    }
}

fn apply_patch(documents: &mut DocumentMap, patch: Patch) -> StoreResult<String> {
    let document = documents
        .get_mut(&patch.id)
        .ok_or_else(|| StoreError::DocumentNotFound(patch.id.clone()))?;
    let body = document
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidDocument(patch.id.clone()))?;

    if let Some(set) = patch.set {
        for (field, value) in set {
            body.insert(field, value);
        }
    }
    if let Some(set_if_missing) = patch.set_if_missing {
        for (field, value) in set_if_missing {
            body.entry(field).or_insert(value);
        }
    }
    if let Some(unset) = patch.unset {
        for field in unset {
            body.remove(&field);
        }
    }

    Ok(patch.id)
}

fn apply(
    documents: &mut DocumentMap,
    mutation: Mutation,
    options: &CommitOptions,
) -> StoreResult<MutationResult> {
    match mutation {
        Mutation::Create(body) => {
            let mut body = require_object(body)?;
            let id = match body.get("_id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => {
                    let id = Uuid::new_v4().to_string();
                    body.insert("_id".to_string(), Value::String(id.clone()));
                    id
                }
            };

            if documents.contains_key(&id) {
                return Err(StoreError::DocumentAlreadyExists(id));
            }

            documents.insert(id.clone(), Value::Object(body));
            Ok(ack("create", id.clone(), documents.get(&id), options))
        }
        Mutation::CreateOrReplace(body) => {
            let body = require_object(body)?;
            let id = require_id(&body)?;
            let operation = if documents.contains_key(&id) {
                "update"
            } else {
                "create"
            };

            documents.insert(id.clone(), Value::Object(body));
            Ok(ack(operation, id.clone(), documents.get(&id), options))
        }
        Mutation::CreateIfNotExists(body) => {
            let body = require_object(body)?;
            let id = require_id(&body)?;

            if documents.contains_key(&id) {
                return Ok(ack("none", id.clone(), documents.get(&id), options));
            }

            documents.insert(id.clone(), Value::Object(body));
            Ok(ack("create", id.clone(), documents.get(&id), options))
        }
        Mutation::Patch(patch) => {
            let id = apply_patch(documents, patch)?;
            Ok(ack("update", id.clone(), documents.get(&id), options))
        }
        Mutation::Delete(target) => {
            // Deletes are idempotent; a missing id is still acknowledged.
            documents.remove(&target.id);
            Ok(ack("delete", target.id, None, options))
        }
    }
}

#[async_trait]
impl RemoteClient for InMemoryRemote {
    async fn execute_query(&self, query: Query, doc_type: &str) -> StoreResult<Vec<Value>> {
        let documents = self.documents.read().await;
        let typed = documents
            .values()
            .filter(|doc| doc.get("_type").and_then(Value::as_str) == Some(doc_type));

        let filtered = match &query.filter {
            Some(expr) => DocumentEvaluator::filter_documents(typed, expr)?,
            None => typed.cloned().collect::<Vec<_>>(),
        };

        let mut matches = filtered;
        if let Some(sort) = &query.sort {
            matches.sort_by(|a, b| {
                let left = a
                    .get(sort.field.as_str())
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);
                let right = b
                    .get(sort.field.as_str())
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                    SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
                }
            });
        }

        Ok(matches
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn fetch_documents(&self, ids: Vec<String>) -> StoreResult<Vec<Value>> {
        let documents = self.documents.read().await;
        let mut found = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some(doc) = documents.get(&id) {
                found.push(doc.clone());
            }
        }

        Ok(found)
    }

    async fn commit_mutations(
        &self,
        payload: MutationPayload,
        options: CommitOptions,
    ) -> StoreResult<MutationResponse> {
        let mut documents = self.documents.write().await;

        // Apply the whole batch to a working copy; swap only on full
        // success so a failing batch has no visible effect.
        let mut working = documents.clone();
        let mut results = Vec::with_capacity(payload.mutations.len());

        for mutation in payload.mutations {
            results.push(apply(&mut working, mutation, &options)?);
        }

        *documents = working;

        Ok(MutationResponse {
            transaction_id: Some(Uuid::new_v4().to_string()),
            results,
        })
    }
}

/// Builder for constructing [`InMemoryRemote`] instances.
#[derive(Default)]
pub struct InMemoryRemoteBuilder;

#[async_trait]
impl RemoteClientBuilder for InMemoryRemoteBuilder {
    type Client = InMemoryRemote;

    /// Builds and returns a new [`InMemoryRemote`]. Always succeeds.
    async fn build(self) -> StoreResult<Self::Client> {
        Ok(InMemoryRemote::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstage_core::mutation::DeleteById;
    use docstage_core::query::Filter;
    use serde_json::json;

    fn payload(mutations: Vec<Mutation>) -> MutationPayload {
        MutationPayload { mutations }
    }

    fn article(id: &str, words: u64) -> Value {
        json!({ "_id": id, "_type": "article", "wordCount": words })
    }

    #[tokio::test]
    async fn commit_applies_a_batch_in_order() {
        let remote = InMemoryRemote::new();
        let response = remote
            .commit_mutations(
                payload(vec![
                    Mutation::Create(article("a", 100)),
                    Mutation::Patch(Patch::new("a").set("wordCount", json!(200))),
                ]),
                CommitOptions { return_ids: true, ..CommitOptions::default() },
            )
            .await
            .unwrap();

        assert!(response.transaction_id.is_some());
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].operation.as_deref(), Some("create"));
        assert_eq!(response.results[1].operation.as_deref(), Some("update"));

        let stored = remote
            .fetch_documents(vec!["a".to_string()])
            .await
            .unwrap();
        assert_eq!(stored[0]["wordCount"], 200);
    }

    #[tokio::test]
    async fn failing_batch_has_no_visible_effect() {
        let remote = InMemoryRemote::new();
        remote
            .commit_mutations(
                payload(vec![Mutation::Create(article("a", 100))]),
                CommitOptions::default(),
            )
            .await
            .unwrap();

        let err = remote
            .commit_mutations(
                payload(vec![
                    Mutation::Create(article("b", 100)),
                    // Duplicate id aborts the batch.
                    Mutation::Create(article("a", 100)),
                ]),
                CommitOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DocumentAlreadyExists(_)));
        assert_eq!(remote.document_count().await, 1);
        assert!(
            remote
                .fetch_documents(vec!["b".to_string()])
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn create_generates_missing_ids() {
        let remote = InMemoryRemote::new();
        let response = remote
            .commit_mutations(
                payload(vec![Mutation::Create(json!({ "_type": "article" }))]),
                CommitOptions { return_ids: true, ..CommitOptions::default() },
            )
            .await
            .unwrap();

        let id = response.results[0].id.clone().unwrap();
        assert!(!id.is_empty());
        assert_eq!(
            remote
                .fetch_documents(vec![id])
                .await
                .unwrap()
                .len(),
            1,
        );
    }

    #[tokio::test]
    async fn create_if_not_exists_skips_existing() {
        let remote = InMemoryRemote::new();
        remote
            .commit_mutations(
                payload(vec![Mutation::Create(article("a", 100))]),
                CommitOptions::default(),
            )
            .await
            .unwrap();

        let response = remote
            .commit_mutations(
                payload(vec![Mutation::CreateIfNotExists(article("a", 999))]),
                CommitOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.results[0].operation.as_deref(), Some("none"));
        let stored = remote
            .fetch_documents(vec!["a".to_string()])
            .await
            .unwrap();
        assert_eq!(stored[0]["wordCount"], 100);
    }

    #[tokio::test]
    async fn patch_of_missing_document_fails() {
        let remote = InMemoryRemote::new();
        let err = remote
            .commit_mutations(
                payload(vec![Mutation::Patch(Patch::new("ghost").set("x", json!(1)))]),
                CommitOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn delete_of_missing_document_is_acknowledged() {
        let remote = InMemoryRemote::new();
        let response = remote
            .commit_mutations(
                payload(vec![Mutation::Delete(DeleteById { id: "ghost".into() })]),
                CommitOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.results[0].operation.as_deref(), Some("delete"));
    }

    #[tokio::test]
    async fn query_scopes_filters_sorts_and_limits() {
        let remote = InMemoryRemote::new();
        remote
            .commit_mutations(
                payload(vec![
                    Mutation::Create(article("a", 300)),
                    Mutation::Create(article("b", 100)),
                    Mutation::Create(article("c", 200)),
                    Mutation::Create(json!({ "_id": "u", "_type": "author" })),
                ]),
                CommitOptions::default(),
            )
            .await
            .unwrap();

        let matches = remote
            .execute_query(
                Query::builder()
                    .filter(Filter::gte("wordCount", 150))
                    .sort("wordCount", SortDirection::Desc)
                    .limit(1)
                    .build(),
                "article",
            )
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["_id"], "a");

        let all_articles = remote
            .execute_query(Query::new(), "article")
            .await
            .unwrap();
        assert_eq!(all_articles.len(), 3);
    }
}
