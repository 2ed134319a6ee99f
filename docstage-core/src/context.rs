//! The data context: a typed unit of work over one remote document
//! database.
//!
//! A [`DataContext`] owns one remote client and one shared mutation queue,
//! and hands out exactly one [`DocumentSet`] per document type. Writes
//! staged through the sets accumulate in the queue until [`commit`]
//! (everything, one transaction) or [`commit_only`] (one document type)
//! sends them to the remote. Only a confirmed acknowledgement clears the
//! committed entries.
//!
//! [`commit`]: DataContext::commit
//! [`commit_only`]: DataContext::commit_only
//!
//! # Example
//!
//! ```ignore
//! use docstage::prelude::*;
//!
//! let context = DataContext::new(client);
//! let articles = context.document_set::<Article>();
//!
//! articles.create(&article)?;
//! context.commit(CommitOptions::default()).await?;
//! ```

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    assets::{FileAsset, ImageAsset, RawDocument},
    document::Document,
    error::{StoreError, StoreResult},
    mutation::MutationBuilder,
    remote::{CommitOptions, RemoteClient},
    response::{MutationResponse, TypedMutationResponse},
    set::DocumentSet,
};

type SetCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// A unit of work over a remote document database.
///
/// The context is safe for concurrent use; the [`shared`](Self::shared)
/// constructor additionally marks it as intended for multiple logical
/// consumers, which documents the usage contract without changing any
/// locking.
pub struct DataContext<C: RemoteClient> {
    client: Arc<C>,
    mutations: Arc<MutationBuilder>,
    sets: Mutex<SetCache>,
    shared: bool,
}

impl<C: RemoteClient> fmt::Debug for DataContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("client", &self.client)
            .field("mutations", &self.mutations)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

impl<C: RemoteClient + 'static> DataContext<C> {
    /// Creates a context around the given remote client.
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            mutations: Arc::new(MutationBuilder::new()),
            sets: Mutex::new(SetCache::new()),
            shared: false,
        }
    }

    /// Creates a context marked as shared between multiple logical
    /// consumers.
    pub fn shared(client: C) -> Self {
        let mut context = Self::new(client);
        context.shared = true;
        context
    }

    /// Whether this context was created for use by multiple consumers.
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// The remote client this context talks through.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The shared queue of pending mutations.
    pub fn mutations(&self) -> &MutationBuilder {
        &self.mutations
    }

    fn lock_sets(&self) -> MutexGuard<'_, SetCache> {
        self.sets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the document set for type `D`, creating it on first access.
    ///
    /// Lookup and creation happen under one guard, so concurrent first
    /// callers for the same type always observe a single instance.
    pub fn document_set<D: Document>(&self) -> Arc<DocumentSet<D, C>> {
        let mut sets = self.lock_sets();
        let entry = sets
            .entry(TypeId::of::<D>())
            .or_insert_with(|| {
                Arc::new(DocumentSet::<D, C>::new(
                    Arc::clone(&self.client),
                    Arc::clone(&self.mutations),
                )) as Arc<dyn Any + Send + Sync>
            });

        match Arc::clone(entry).downcast::<DocumentSet<D, C>>() {
            Ok(set) => set,
            Err(_) => unreachable!("set cache entries are keyed by their document type"),
        }
    }

    /// The untyped document set, for staging heterogeneous writes.
    pub fn documents(&self) -> Arc<DocumentSet<RawDocument, C>> {
        self.document_set::<RawDocument>()
    }

    /// The built-in image asset set.
    pub fn images(&self) -> Arc<DocumentSet<ImageAsset, C>> {
        self.document_set::<ImageAsset>()
    }

    /// The built-in file asset set.
    pub fn files(&self) -> Arc<DocumentSet<FileAsset, C>> {
        self.document_set::<FileAsset>()
    }

    /// Discards all pending mutations across all document types without
    /// contacting the remote. Always succeeds.
    pub fn clear_changes(&self) {
        self.mutations.clear();
    }

    /// Sends every pending mutation to the remote as one atomic
    /// transaction.
    ///
    /// The queue is snapshotted once; only a successful acknowledgement
    /// removes the snapshotted entries, so a failed commit leaves all
    /// staged work intact for inspection or retry. With nothing staged the
    /// empty response is returned without any remote call.
    ///
    /// # Errors
    ///
    /// Propagates remote failures unchanged.
    pub async fn commit(&self, options: CommitOptions) -> StoreResult<MutationResponse> {
        let (payload, staged) = self.mutations.snapshot();
        if staged == 0 {
            return Ok(MutationResponse::default());
        }

        let response = self
            .client
            .commit_mutations(payload, options)
            .await?;
        self.mutations.confirm(staged);

        Ok(response)
    }

    /// Sends only the mutations staged for document type `D` as one atomic
    /// transaction, leaving every other type's entries queued in their
    /// original order.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::NoPendingChanges`], before any network
    /// call, when zero mutations are staged for `D`. Remote failures
    /// propagate unchanged and leave the queue untouched.
    pub async fn commit_only<D: Document>(
        &self,
        options: CommitOptions,
    ) -> StoreResult<TypedMutationResponse<D>> {
        let doc_type = D::document_type();
        let (payload, staged) = self.mutations.snapshot_for(doc_type);
        if staged == 0 {
            return Err(StoreError::NoPendingChanges(doc_type.to_string()));
        }

        let response = self
            .client
            .commit_mutations(payload, options)
            .await?;
        self.mutations
            .confirm_for(doc_type, staged);

        response.into_typed()
    }
}
