//! Typed document sets: the per-type query-and-write facade of a context.

use std::{marker::PhantomData, sync::Arc};

use crate::{
    document::{Document, DocumentExt},
    error::StoreResult,
    mutation::{DeleteById, Mutation, MutationBuilder, Patch},
    query::Query,
    remote::RemoteClient,
};

/// The collection of documents of type `D` reachable through one context.
///
/// A set holds shared handles to its context's remote client and mutation
/// queue; it never owns the context and never outlives it. Exactly one set
/// exists per document type per context; obtain it through
/// [`DataContext::document_set`](crate::context::DataContext::document_set),
/// never construct one directly.
///
/// The write surface is synchronous and purely local: each call serializes
/// the operation and appends it to the context's shared mutation queue,
/// tagged with `D`'s document type. Nothing touches the network until the
/// context commits. The read surface goes straight to the remote client.
#[derive(Debug)]
pub struct DocumentSet<D: Document, C: RemoteClient> {
    client: Arc<C>,
    mutations: Arc<MutationBuilder>,
    _marker: PhantomData<D>,
}

impl<D: Document, C: RemoteClient> DocumentSet<D, C> {
    pub(crate) fn new(client: Arc<C>, mutations: Arc<MutationBuilder>) -> Self {
        Self { client, mutations, _marker: PhantomData }
    }

    /// The document-type tag this set stages and queries under.
    pub fn doc_type(&self) -> &'static str {
        D::document_type()
    }

    /// Number of mutations currently staged for this type.
    pub fn pending(&self) -> usize {
        self.mutations.for_tag(D::document_type()).len()
    }

    /// Stages a create. The remote rejects the batch if the id is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to serialize.
    pub fn create(&self, document: &D) -> StoreResult<()> {
        let body = document.to_json()?;
        self.register(Mutation::Create(body));

        Ok(())
    }

    /// Stages a create-or-replace: the document is written whether or not
    /// its id already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to serialize.
    pub fn create_or_replace(&self, document: &D) -> StoreResult<()> {
        let body = document.to_json()?;
        self.register(Mutation::CreateOrReplace(body));

        Ok(())
    }

    /// Stages a create that the remote skips when the id already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to serialize.
    pub fn create_if_not_exists(&self, document: &D) -> StoreResult<()> {
        let body = document.to_json()?;
        self.register(Mutation::CreateIfNotExists(body));

        Ok(())
    }

    /// Stages a full update of an existing document (a replace on the
    /// wire).
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to serialize.
    pub fn update(&self, document: &D) -> StoreResult<()> {
        self.create_or_replace(document)
    }

    /// Stages a partial patch.
    pub fn patch(&self, patch: Patch) {
        self.register(Mutation::Patch(patch));
    }

    /// Stages a delete by id.
    pub fn delete(&self, id: impl Into<String>) {
        self.register(Mutation::Delete(DeleteById { id: id.into() }));
    }

    /// Stages a delete of the given document.
    pub fn delete_document(&self, document: &D) {
        self.delete(document.id());
    }

    fn register(&self, mutation: Mutation) {
        self.mutations
            .register(D::document_type(), mutation);
    }

    /// Fetches one document by id. Returns `None` when the remote does not
    /// know the id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the body does not
    /// deserialize as `D`.
    pub async fn get(&self, id: &str) -> StoreResult<Option<D>> {
        Ok(self
            .client
            .fetch_documents(vec![id.to_string()])
            .await?
            .pop()
            .map(D::from_json)
            .transpose()?)
    }

    /// Fetches documents by id. Unknown ids are omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when a body does not
    /// deserialize as `D`.
    pub async fn get_many(&self, ids: Vec<String>) -> StoreResult<Vec<D>> {
        self.client
            .fetch_documents(ids)
            .await?
            .into_iter()
            .map(D::from_json)
            .collect()
    }

    /// Runs a query scoped to this set's document type and materializes
    /// the matches.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, remote rejection of the
    /// query, or when a match does not deserialize as `D`.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<D>> {
        self.client
            .execute_query(query, D::document_type())
            .await?
            .into_iter()
            .map(D::from_json)
            .collect()
    }
}
