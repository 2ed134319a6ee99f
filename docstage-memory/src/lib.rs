//! In-memory remote client for docstage.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `RemoteClient` trait. It applies mutation batches with the same
//! all-or-nothing semantics as the real service and evaluates queries
//! locally, which makes it ideal for development and tests.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Transactional commits** - A failing batch leaves no visible effect
//! - **Full query support** - Filtering, sorting, and pagination via local evaluation
//!
//! # Quick Start
//!
//! ```ignore
//! use docstage::{DataContext, CommitOptions, memory::InMemoryRemote};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = DataContext::new(InMemoryRemote::new());
//!     let articles = context.document_set::<Article>();
//!
//!     articles.create(&article)?;
//!     context.commit(CommitOptions::default()).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docstage_memory;

pub mod evaluator;
pub mod remote;

pub use remote::{InMemoryRemote, InMemoryRemoteBuilder};
