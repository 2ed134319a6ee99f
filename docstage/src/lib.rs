//! Main docstage crate providing a typed unit of work over remote JSON
//! document databases.
//!
//! This crate is the primary entry point for users of the docstage
//! framework. It re-exports the core types and functionality from the
//! sub-crates and provides convenient access to the available remote
//! clients.
//!
//! # Features
//!
//! - **Typed document sets** - One lazily created, cached set per document type per context
//! - **Staged mutations** - Create/update/patch/delete accumulate locally in registration order
//! - **Transactional commits** - All staged work (or one type's) goes out as a single atomic
//!   request; the queue is cleared only on a confirmed acknowledgement
//! - **Pluggable remotes** - In-memory client for development and tests, HTTP client for the
//!   real service (behind the `http` feature)
//!
//! # Quick Start
//!
//! ```ignore
//! use docstage::{prelude::*, memory::InMemoryRemote};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Article {
//!     #[serde(rename = "_id")]
//!     pub id: String,
//!     pub title: String,
//! }
//!
//! impl Document for Article {
//!     fn id(&self) -> &str { &self.id }
//!     fn document_type() -> &'static str { "article" }
//! }
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let context = DataContext::new(InMemoryRemote::new());
//!
//!     // Every call for the same type returns the same set.
//!     let articles = context.document_set::<Article>();
//!
//!     // Writes are staged locally...
//!     articles.create(&Article {
//!         id: "article-1".to_string(),
//!         title: "Staging writes".to_string(),
//!     })?;
//!     articles.patch(Patch::new("article-0").set("title", "Renamed".into()));
//!
//!     // ...and leave the process only on commit, as one transaction.
//!     context.commit(CommitOptions::default()).await?;
//!
//!     // Reads go straight to the remote.
//!     let published = articles
//!         .query(Query::builder().filter(Filter::eq("title", "Staging writes")).build())
//!         .await?;
//!     println!("found {} articles", published.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Committing one document type
//!
//! A context used for several document types can flush just one of them;
//! everything else stays staged, in order:
//!
//! ```ignore
//! use docstage::prelude::*;
//!
//! # async fn example<C: RemoteClient + 'static>(context: DataContext<C>) -> StoreResult<()> {
//! let response = context
//!     .commit_only::<Article>(CommitOptions::returning_ids(Visibility::Sync))
//!     .await?;
//!
//! for result in &response.results {
//!     println!("{:?} -> {:?}", result.operation, result.id);
//! }
//! # Ok(()) }
//! ```
//!
//! Committing a type with nothing staged is an error
//! ([`StoreError::NoPendingChanges`](error::StoreError::NoPendingChanges))
//! rather than an empty remote round trip.
//!
//! # Connecting over HTTP
//!
//! With the `http` feature enabled:
//!
//! ```ignore
//! use docstage::{prelude::*, http::HttpRemote};
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let remote = HttpRemote::builder(
//!         ConnectionOptions::new("my-project", "production").with_token("secret"),
//!     )
//!     .build()
//!     .await?;
//!
//!     let context = DataContext::shared(remote);
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! # Remotes
//!
//! - [`memory`] - Fast in-memory client for development and testing
//! - [`http`] - HTTP client for the real service (requires the `http` feature)

pub mod prelude;

pub use docstage_core::{
    assets, context, document, error, mutation, options, query, remote, response, set,
};

/// In-memory remote client implementations.
pub mod memory {
    pub use docstage_memory::{InMemoryRemote, InMemoryRemoteBuilder};
}

/// HTTP remote client implementations.
///
/// This module is only available when the `http` feature is enabled.
#[cfg(feature = "http")]
pub mod http {
    pub use docstage_http::{HttpRemote, HttpRemoteBuilder};
}
