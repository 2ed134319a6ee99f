//! Convenient re-exports of commonly used types from docstage.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docstage::prelude::*;
//! ```
//!
//! This provides access to:
//! - The data context and document sets
//! - Document traits and built-in document types
//! - Mutation staging and commit options
//! - Query construction and filtering
//! - Remote client traits
//! - Error types

pub use docstage_core::{
    assets::{FileAsset, ImageAsset, RawDocument},
    context::DataContext,
    document::{Document, DocumentExt, Reference},
    error::{StoreError, StoreResult},
    mutation::{DeleteById, Mutation, MutationBuilder, MutationPayload, Patch, ScopedMutations},
    options::ConnectionOptions,
    query::{Expr, FieldOp, Filter, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    remote::{CommitOptions, RemoteClient, RemoteClientBuilder, Visibility},
    response::{MutationResponse, MutationResult, TypedMutationResponse, TypedMutationResult},
    set::DocumentSet,
};
