//! HTTP remote client implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use docstage_core::{
    error::{StoreError, StoreResult},
    mutation::MutationPayload,
    options::ConnectionOptions,
    query::Query,
    remote::{CommitOptions, RemoteClient, RemoteClientBuilder},
    response::MutationResponse,
};

use crate::query::render;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote client speaking the document database's HTTP data API.
///
/// Owns one connection-pooled [`reqwest::Client`]; clones share the pool.
/// Construct through [`HttpRemote::builder`], which validates the
/// connection options before anything touches the network.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    http: reqwest::Client,
    options: ConnectionOptions,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    result: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DocumentsEnvelope {
    documents: Vec<Value>,
}

impl HttpRemote {
    /// Creates a builder for the given connection options.
    pub fn builder(options: ConnectionOptions) -> HttpRemoteBuilder {
        HttpRemoteBuilder { options }
    }

    fn url(&self, segment: &str) -> String {
        format!("{}/{}/{}", self.endpoint, segment, self.options.dataset)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.options.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Remote(format!("{}: {}", status, body)))
    }

    fn transport(err: reqwest::Error) -> StoreError {
        StoreError::Remote(err.to_string())
    }
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn execute_query(&self, query: Query, doc_type: &str) -> StoreResult<Vec<Value>> {
        let rendered = render(&query, doc_type)?;
        tracing::debug!(doc_type, query = %rendered, "executing remote query");

        let response = self
            .authorize(self.http.post(self.url("query")))
            .json(&json!({ "query": rendered }))
            .send()
            .await
            .map_err(Self::transport)?;

        let envelope: QueryEnvelope = Self::check(response)
            .await?
            .json()
            .await
            .map_err(Self::transport)?;

        tracing::trace!(matches = envelope.result.len(), "query returned");
        Ok(envelope.result)
    }

    async fn fetch_documents(&self, ids: Vec<String>) -> StoreResult<Vec<Value>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/{}", self.url("doc"), ids.join(","));
        tracing::debug!(count = ids.len(), "fetching documents by id");

        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(Self::transport)?;

        let envelope: DocumentsEnvelope = Self::check(response)
            .await?
            .json()
            .await
            .map_err(Self::transport)?;

        Ok(envelope.documents)
    }

    async fn commit_mutations(
        &self,
        payload: MutationPayload,
        options: CommitOptions,
    ) -> StoreResult<MutationResponse> {
        tracing::debug!(
            mutations = payload.len(),
            visibility = options.visibility.as_str(),
            "committing mutation batch",
        );

        let response = self
            .authorize(self.http.post(self.url("mutate")))
            .query(&[
                ("returnIds", options.return_ids.to_string()),
                ("returnDocuments", options.return_documents.to_string()),
                ("visibility", options.visibility.as_str().to_string()),
            ])
            .json(&payload)
            .send()
            .await
            .map_err(Self::transport)?;

        let acknowledged: MutationResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(Self::transport)?;

        tracing::trace!(
            transaction_id = acknowledged.transaction_id.as_deref(),
            "mutation batch acknowledged",
        );
        Ok(acknowledged)
    }
}

/// Builder for [`HttpRemote`] instances.
///
/// Validation happens here, so misconfigured contexts fail before any
/// network activity.
pub struct HttpRemoteBuilder {
    options: ConnectionOptions,
}

#[async_trait]
impl RemoteClientBuilder for HttpRemoteBuilder {
    type Client = HttpRemote;

    async fn build(self) -> StoreResult<HttpRemote> {
        self.options.validate()?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        let endpoint = self.options.endpoint();

        Ok(HttpRemote { http, options: self.options, endpoint })
    }
}
