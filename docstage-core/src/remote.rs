//! Remote client abstraction for the data context.
//!
//! This module defines the trait the context talks through for everything
//! that leaves the process: executing queries and committing mutation
//! batches. Implementations range from the in-memory client used in tests
//! to the HTTP client speaking to the real service.
//!
//! # Contract
//!
//! Implementations must surface transport, authentication, and remote
//! validation failures as errors, never as partial results. The context
//! relies on that to decide whether staged mutations may be cleared.
//!
//! All implementations must be thread-safe (`Send + Sync`) and tolerate
//! concurrent calls from multiple async tasks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    error::StoreResult,
    mutation::MutationPayload,
    query::Query,
    response::MutationResponse,
};

/// Consistency mode for when a committed mutation becomes observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// The commit call returns only once the mutation is visible to
    /// subsequent queries.
    #[default]
    Sync,
    /// The commit is acknowledged as soon as it is durably accepted;
    /// visibility to queries may lag.
    Async,
    /// The mutation may be batched remotely and applied later.
    Deferred,
}

impl Visibility {
    /// The wire parameter value for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Sync => "sync",
            Visibility::Async => "async",
            Visibility::Deferred => "deferred",
        }
    }
}

/// Options forwarded with a commit request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitOptions {
    /// Ask the remote to report the affected document ids.
    pub return_ids: bool,
    /// Ask the remote to return resulting document snapshots.
    pub return_documents: bool,
    /// Requested consistency mode.
    pub visibility: Visibility,
}

impl CommitOptions {
    /// Options requesting ids back, with the given visibility.
    pub fn returning_ids(visibility: Visibility) -> Self {
        Self { return_ids: true, return_documents: false, visibility }
    }

    /// Options requesting full document snapshots back, with the given
    /// visibility.
    pub fn returning_documents(visibility: Visibility) -> Self {
        Self { return_ids: true, return_documents: true, visibility }
    }
}

/// Abstract interface to the remote document database.
///
/// The context owns exactly one client and shares it with every document
/// set it hands out. Queries and commits are async, non-blocking calls
/// that suspend the caller until the remote responds; cancellation and
/// timeout behavior is whatever the implementation inherits from its
/// transport.
#[async_trait]
pub trait RemoteClient: Send + Sync + Debug {
    /// Executes a typed query against documents carrying the given type
    /// tag and returns the matching document bodies.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or remote-side rejection of
    /// the query.
    async fn execute_query(&self, query: Query, doc_type: &str) -> StoreResult<Vec<Value>>;

    /// Fetches documents by identifier. Unknown identifiers are omitted
    /// from the result rather than reported as errors.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    async fn fetch_documents(&self, ids: Vec<String>) -> StoreResult<Vec<Value>>;

    /// Submits a mutation payload as one atomic transaction.
    ///
    /// Either the whole batch is applied and acknowledged, or the call
    /// fails and nothing is applied; implementations must not report
    /// partial application as success.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the remote rejects
    /// the batch.
    async fn commit_mutations(
        &self,
        payload: MutationPayload,
        options: CommitOptions,
    ) -> StoreResult<MutationResponse>;
}

/// Factory trait for constructing remote clients.
///
/// Builders validate their configuration during `build`, before any
/// network activity, so configuration errors fail fast and synchronously
/// from the caller's point of view.
#[async_trait]
pub trait RemoteClientBuilder {
    /// The client type this builder produces.
    type Client: RemoteClient;

    /// Builds and returns the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when required options are missing or
    /// invalid.
    async fn build(self) -> StoreResult<Self::Client>;
}
