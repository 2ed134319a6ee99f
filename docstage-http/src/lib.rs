//! HTTP remote client for docstage.
//!
//! This crate implements the `RemoteClient` trait over the document
//! database's HTTP data API: queries are translated to the remote query
//! language and POSTed to the query endpoint, mutation batches are POSTed
//! to the mutate endpoint as one transaction.
//!
//! To use this client, enable the `http` feature of the `docstage` crate:
//!
//! ```toml
//! [dependencies]
//! docstage = { version = "x.y.z", features = ["http"] }
//! ```
//!
//! # Connection
//!
//! Clients are built from [`ConnectionOptions`]: project id, dataset,
//! optional bearer token, API version, and an optional base-URL override
//! for self-hosted deployments. Validation happens in the builder, before
//! anything touches the network.
//!
//! [`ConnectionOptions`]: docstage_core::options::ConnectionOptions
//!
//! # Example
//!
//! ```ignore
//! use docstage::{options::ConnectionOptions, remote::RemoteClientBuilder, http::HttpRemote};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let remote = HttpRemote::builder(
//!         ConnectionOptions::new("my-project", "production").with_token("secret"),
//!     )
//!     .build()
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docstage_http;

pub mod query;
pub mod remote;

pub use remote::{HttpRemote, HttpRemoteBuilder};
