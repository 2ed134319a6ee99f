//! Integration tests for the data context's unit-of-work and commit
//! protocol, driven through the in-memory remote and a recording remote
//! that can simulate outages.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use docstage::memory::InMemoryRemote;
use docstage::prelude::*;

fn article_type() -> String {
    "article".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Article {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_type", default = "article_type")]
    doc_type: String,
    title: String,
}

impl Article {
    fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            doc_type: article_type(),
            title: title.to_string(),
        }
    }
}

impl Document for Article {
    fn id(&self) -> &str {
        &self.id
    }

    fn document_type() -> &'static str {
        "article"
    }
}

fn author_type() -> String {
    "author".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Author {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_type", default = "author_type")]
    doc_type: String,
    name: String,
}

impl Author {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            doc_type: author_type(),
            name: name.to_string(),
        }
    }
}

impl Document for Author {
    fn id(&self) -> &str {
        &self.id
    }

    fn document_type() -> &'static str {
        "author"
    }
}

/// A remote that records every commit it receives and can be told to
/// reject them all, for exercising the failure paths.
#[derive(Debug, Default)]
struct RecordingRemote {
    commits: AtomicUsize,
    queries: AtomicUsize,
    fail_commits: bool,
    last_payload: Mutex<Option<MutationPayload>>,
}

impl RecordingRemote {
    fn new() -> Self {
        Self::default()
    }

    fn failing() -> Self {
        Self { fail_commits: true, ..Self::default() }
    }

    fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn last_payload(&self) -> Option<MutationPayload> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteClient for RecordingRemote {
    async fn execute_query(&self, _query: Query, _doc_type: &str) -> StoreResult<Vec<Value>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(vec![])
    }

    async fn fetch_documents(&self, _ids: Vec<String>) -> StoreResult<Vec<Value>> {
        Ok(vec![])
    }

    async fn commit_mutations(
        &self,
        payload: MutationPayload,
        _options: CommitOptions,
    ) -> StoreResult<MutationResponse> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());

        if self.fail_commits {
            return Err(StoreError::Remote("simulated outage".to_string()));
        }

        Ok(MutationResponse {
            transaction_id: Some("txn-1".to_string()),
            results: payload
                .mutations
                .iter()
                .map(|_| MutationResult::default())
                .collect(),
        })
    }
}

#[tokio::test]
async fn document_sets_are_singletons_per_type() {
    let context = DataContext::new(InMemoryRemote::new());

    let first = context.document_set::<Article>();
    let second = context.document_set::<Article>();
    assert!(Arc::ptr_eq(&first, &second));

    let authors = context.document_set::<Author>();
    assert_ne!(first.doc_type(), authors.doc_type());
}

#[tokio::test]
async fn full_commit_applies_everything_and_clears_the_queue() {
    let context = DataContext::new(InMemoryRemote::new());
    let articles = context.document_set::<Article>();
    let authors = context.document_set::<Author>();

    articles.create(&Article::new("article-1", "Hello")).unwrap();
    authors.create(&Author::new("author-1", "Maria")).unwrap();
    assert_eq!(context.mutations().len(), 2);

    let response = context.commit(CommitOptions::default()).await.unwrap();
    assert!(response.transaction_id.is_some());
    assert!(context.mutations().is_empty());
    assert_eq!(articles.pending(), 0);
    assert_eq!(authors.pending(), 0);

    let found = articles.get("article-1").await.unwrap();
    assert_eq!(found.unwrap().title, "Hello");
}

#[tokio::test]
async fn empty_full_commit_never_contacts_the_remote() {
    let context = DataContext::new(RecordingRemote::new());

    let response = context.commit(CommitOptions::default()).await.unwrap();
    assert_eq!(response, MutationResponse::default());
    assert_eq!(context.client().commit_count(), 0);
}

#[tokio::test]
async fn clear_changes_discards_all_staged_work_locally() {
    let context = DataContext::new(RecordingRemote::new());
    context
        .document_set::<Article>()
        .create(&Article::new("article-1", "Hello"))
        .unwrap();
    context.document_set::<Author>().delete("author-9");

    context.clear_changes();
    assert!(context.mutations().is_empty());

    let response = context.commit(CommitOptions::default()).await.unwrap();
    assert_eq!(response, MutationResponse::default());
    assert_eq!(context.client().commit_count(), 0);
}

#[tokio::test]
async fn per_type_commit_with_nothing_staged_fails_before_the_network() {
    let context = DataContext::new(RecordingRemote::new());
    context
        .document_set::<Author>()
        .update(&Author::new("author-1", "Maria"))
        .unwrap();

    let err = context
        .commit_only::<Article>(CommitOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NoPendingChanges(ref t) if t == "article"));
    assert_eq!(context.client().commit_count(), 0);
    // The author mutation is still staged.
    assert_eq!(context.mutations().for_tag("author").len(), 1);
}

#[tokio::test]
async fn per_type_commit_submits_and_clears_only_that_type() {
    let context = DataContext::new(RecordingRemote::new());
    let articles = context.document_set::<Article>();
    let authors = context.document_set::<Author>();

    articles.create(&Article::new("article-1", "First")).unwrap();
    authors.update(&Author::new("author-1", "Maria")).unwrap();
    articles.delete("article-0");

    context
        .commit_only::<Article>(CommitOptions::default())
        .await
        .unwrap();

    // Only the two article mutations went out, in registration order.
    let submitted = context.client().last_payload().unwrap();
    assert_eq!(submitted.len(), 2);
    assert!(matches!(submitted.mutations[0], Mutation::Create(_)));
    assert!(matches!(submitted.mutations[1], Mutation::Delete(_)));

    // The author mutation alone remains staged.
    assert_eq!(context.mutations().len(), 1);
    assert_eq!(context.mutations().for_tag("author").len(), 1);
    assert_eq!(context.mutations().for_tag("article").len(), 0);
}

#[tokio::test]
async fn article_create_and_author_update_commit_independently() {
    let context = DataContext::new(InMemoryRemote::new());
    let articles = context.document_set::<Article>();
    let authors = context.document_set::<Author>();

    // The author exists already; this unit of work updates it and creates
    // an article.
    authors.create(&Author::new("author-1", "Maria")).unwrap();
    context.commit(CommitOptions::default()).await.unwrap();

    articles.create(&Article::new("article-1", "Hello")).unwrap();
    authors.update(&Author::new("author-1", "Maria R.")).unwrap();

    context
        .commit_only::<Article>(CommitOptions::default())
        .await
        .unwrap();

    // The article landed; the author update is still pending.
    assert!(articles.get("article-1").await.unwrap().is_some());
    assert_eq!(authors.get("author-1").await.unwrap().unwrap().name, "Maria");
    assert_eq!(context.mutations().for_tag("author").len(), 1);

    context.commit(CommitOptions::default()).await.unwrap();
    assert_eq!(
        authors.get("author-1").await.unwrap().unwrap().name,
        "Maria R.",
    );
    assert!(context.mutations().is_empty());
}

#[tokio::test]
async fn failed_commit_leaves_the_queue_untouched() {
    let context = DataContext::new(RecordingRemote::failing());
    let articles = context.document_set::<Article>();
    let authors = context.document_set::<Author>();

    articles.create(&Article::new("article-1", "First")).unwrap();
    authors.delete("author-1");
    articles.patch(Patch::new("article-2").set("title", json!("Second")));

    let before = context.mutations().build();

    let err = context.commit(CommitOptions::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::Remote(_)));

    // Same entries, same order.
    assert_eq!(context.mutations().build(), before);
    assert_eq!(context.mutations().len(), 3);

    let err = context
        .commit_only::<Article>(CommitOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Remote(_)));
    assert_eq!(context.mutations().build(), before);
}

#[tokio::test]
async fn typed_commit_narrows_returned_documents() {
    let context = DataContext::new(InMemoryRemote::new());
    let articles = context.document_set::<Article>();

    articles.create(&Article::new("article-1", "Hello")).unwrap();

    let response = context
        .commit_only::<Article>(CommitOptions::returning_documents(Visibility::Sync))
        .await
        .unwrap();

    let returned = response.documents().collect::<Vec<_>>();
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].title, "Hello");
}

#[tokio::test]
async fn sets_query_through_the_remote() {
    let context = DataContext::new(InMemoryRemote::new());
    let articles = context.document_set::<Article>();
    let authors = context.document_set::<Author>();

    articles.create(&Article::new("article-1", "Rust at work")).unwrap();
    articles.create(&Article::new("article-2", "Databases")).unwrap();
    authors.create(&Author::new("author-1", "Maria")).unwrap();
    context.commit(CommitOptions::default()).await.unwrap();

    let matches = articles
        .query(
            Query::builder()
                .filter(Filter::starts_with("title", "Rust"))
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "article-1");

    // The author set never sees article documents.
    let all_authors = authors.query(Query::new()).await.unwrap();
    assert_eq!(all_authors.len(), 1);
}

#[tokio::test]
async fn staging_is_local_until_commit() {
    let context = DataContext::new(RecordingRemote::new());
    let articles = context.document_set::<Article>();

    articles.create(&Article::new("article-1", "Hello")).unwrap();
    articles.patch(Patch::new("article-1").set("title", json!("Hi")));
    articles.delete("article-2");

    assert_eq!(articles.pending(), 3);
    assert_eq!(context.client().commit_count(), 0);
    assert_eq!(context.client().query_count(), 0);
}
