//! A typed unit-of-work client for remote JSON document databases.
//!
//! This crate is the core of the docstage project and provides:
//!
//! - **Document traits** ([`document`]) - Core traits for defining and serializing documents
//! - **Data context** ([`context`]) - The unit of work owning the remote client and staged mutations
//! - **Document sets** ([`set`]) - Typed per-type query-and-write facades
//! - **Mutation staging** ([`mutation`]) - The shared ordered queue of pending operations
//! - **Commit responses** ([`response`]) - Remote acknowledgement types
//! - **Query API** ([`query`]) - Type-safe query construction and filtering
//! - **Remote client abstraction** ([`remote`]) - The trait backends implement
//! - **Connection options** ([`options`]) - Construction-time configuration
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docstage::{Document, DataContext, CommitOptions};
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
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!
//!     fn document_type() -> &'static str {
//!         "article"
//!     }
//! }
//!
//! # async fn example(client: impl docstage::remote::RemoteClient + 'static) -> docstage::error::StoreResult<()> {
//! let context = DataContext::new(client);
//! let articles = context.document_set::<Article>();
//!
//! articles.create(&Article { id: "article-1".into(), title: "Hello".into() })?;
//! context.commit(CommitOptions::default()).await?;
//! # Ok(()) }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docstage_core;

pub mod assets;
pub mod context;
pub mod document;
pub mod error;
pub mod mutation;
pub mod options;
pub mod query;
pub mod remote;
pub mod response;
pub mod set;
