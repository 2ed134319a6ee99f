//! Mutation staging: the wire-level mutation types and the shared ordered
//! queue every document set of a context registers into.
//!
//! The queue lives in the context and is handed to document sets only
//! through the append-only [`MutationBuilder::register`] interface; the raw
//! container is never exposed. Commits read a snapshot of the queue and
//! confirm it afterwards, so a registration racing an in-flight commit is
//! never lost and a failed commit removes nothing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;

/// A single staged operation against one document.
///
/// The externally tagged serde representation is the wire form the remote
/// service expects: `{"create": {...}}`, `{"patch": {...}}`, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    /// Create a new document. The remote rejects the batch when a document
    /// with the same id already exists.
    Create(Value),
    /// Create the document, replacing any existing document with its id.
    CreateOrReplace(Value),
    /// Create the document only when its id is not taken; otherwise skip.
    CreateIfNotExists(Value),
    /// Apply a partial patch to an existing document.
    Patch(Patch),
    /// Delete a document by id.
    Delete(DeleteById),
}

/// A partial update of one existing document.
///
/// Sections are applied in the remote's defined order: `set` overwrites,
/// `setIfMissing` fills absent fields, `unset` removes fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Identifier of the document to patch.
    pub id: String,
    /// Fields to overwrite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Map<String, Value>>,
    /// Fields to write only where currently absent.
    #[serde(rename = "setIfMissing", skip_serializing_if = "Option::is_none")]
    pub set_if_missing: Option<Map<String, Value>>,
    /// Field names to remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unset: Option<Vec<String>>,
}

impl Patch {
    /// Creates an empty patch targeting the given document id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// Adds a field to the `set` section.
    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set
            .get_or_insert_with(Map::new)
            .insert(field.into(), value);
        self
    }

    /// Adds a field to the `setIfMissing` section.
    pub fn set_if_missing(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set_if_missing
            .get_or_insert_with(Map::new)
            .insert(field.into(), value);
        self
    }

    /// Adds a field name to the `unset` section.
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.unset
            .get_or_insert_with(Vec::new)
            .push(field.into());
        self
    }
}

/// Delete target carried by [`Mutation::Delete`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteById {
    /// Identifier of the document to delete.
    pub id: String,
}

/// One queued mutation together with the document-type tag it was staged
/// under.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationEntry {
    /// Type tag of the document set that registered this entry.
    pub doc_type: &'static str,
    /// The staged operation.
    pub mutation: Mutation,
}

/// The serializable body of a commit request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationPayload {
    /// Mutations in registration order; the remote applies them in
    /// submission order within one transaction.
    pub mutations: Vec<Mutation>,
}

impl MutationPayload {
    /// Number of mutations in the payload.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// True when the payload carries no mutations.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// The ordered queue of pending mutations shared by every document set of a
/// context.
///
/// Registration is synchronous and purely local; the queue never touches
/// the network itself. Entries preserve registration order, since the
/// remote's transactional semantics apply operations in submission order.
#[derive(Debug, Default)]
pub struct MutationBuilder {
    entries: Mutex<Vec<MutationEntry>>,
}

impl MutationBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MutationEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a mutation tagged with the given document type.
    ///
    /// No payload validation happens here; callers (the document sets)
    /// serialize and shape the operation.
    pub fn register(&self, doc_type: &'static str, mutation: Mutation) {
        self.lock().push(MutationEntry { doc_type, mutation });
    }

    /// Serializes the current queue into a commit payload without mutating
    /// the queue.
    pub fn build(&self) -> MutationPayload {
        MutationPayload {
            mutations: self
                .lock()
                .iter()
                .map(|entry| entry.mutation.clone())
                .collect(),
        }
    }

    /// Number of queued entries across all document types.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards every queued entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns a view restricted to entries tagged with `D`'s document
    /// type.
    pub fn for_type<D: Document>(&self) -> ScopedMutations<'_> {
        self.for_tag(D::document_type())
    }

    /// Returns a view restricted to entries tagged with the given document
    /// type.
    pub fn for_tag(&self, doc_type: &'static str) -> ScopedMutations<'_> {
        ScopedMutations { doc_type, builder: self }
    }

    /// Snapshot of the whole queue for a commit: the payload plus the
    /// number of entries it covers.
    pub(crate) fn snapshot(&self) -> (MutationPayload, usize) {
        let entries = self.lock();
        let payload = MutationPayload {
            mutations: entries
                .iter()
                .map(|entry| entry.mutation.clone())
                .collect(),
        };
        let count = entries.len();
        (payload, count)
    }

    /// Snapshot of the entries tagged with `doc_type`.
    pub(crate) fn snapshot_for(&self, doc_type: &str) -> (MutationPayload, usize) {
        let entries = self.lock();
        let mutations = entries
            .iter()
            .filter(|entry| entry.doc_type == doc_type)
            .map(|entry| entry.mutation.clone())
            .collect::<Vec<_>>();
        let count = mutations.len();
        (MutationPayload { mutations }, count)
    }

    /// Removes the first `count` entries after a confirmed full commit.
    ///
    /// Entries registered while the commit was in flight sit behind the
    /// snapshotted prefix and survive.
    pub(crate) fn confirm(&self, count: usize) {
        let mut entries = self.lock();
        let count = count.min(entries.len());
        entries.drain(..count);
    }

    /// Removes the first `count` entries tagged `doc_type` after a
    /// confirmed per-type commit. Entries of other types are untouched and
    /// keep their order.
    pub(crate) fn confirm_for(&self, doc_type: &str, count: usize) {
        let mut entries = self.lock();
        let mut remaining = count;
        entries.retain(|entry| {
            if remaining > 0 && entry.doc_type == doc_type {
                remaining -= 1;
                false
            } else {
                true
            }
        });
    }
}

/// A view over the mutation queue restricted to one document type.
///
/// `clear` removes only entries carrying this view's tag; everything else
/// delegates to the shared queue.
#[derive(Debug)]
pub struct ScopedMutations<'a> {
    doc_type: &'static str,
    builder: &'a MutationBuilder,
}

impl ScopedMutations<'_> {
    /// The document-type tag this view is restricted to.
    pub fn doc_type(&self) -> &'static str {
        self.doc_type
    }

    /// Number of queued entries carrying this tag.
    pub fn len(&self) -> usize {
        self.builder
            .lock()
            .iter()
            .filter(|entry| entry.doc_type == self.doc_type)
            .count()
    }

    /// True when no entry carries this tag.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the tagged subset into a commit payload without mutating
    /// the queue.
    pub fn build(&self) -> MutationPayload {
        let (payload, _) = self.builder.snapshot_for(self.doc_type);
        payload
    }

    /// Removes every entry carrying this tag from the shared queue.
    pub fn clear(&self) {
        self.builder
            .lock()
            .retain(|entry| entry.doc_type != self.doc_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str) -> Value {
        json!({ "_id": id, "_type": "article" })
    }

    #[test]
    fn preserves_registration_order() {
        let builder = MutationBuilder::new();
        builder.register("article", Mutation::Create(doc("a")));
        builder.register("author", Mutation::Delete(DeleteById { id: "b".into() }));
        builder.register("article", Mutation::Create(doc("c")));

        let payload = builder.build();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.mutations[0], Mutation::Create(doc("a")));
        assert_eq!(
            payload.mutations[1],
            Mutation::Delete(DeleteById { id: "b".into() }),
        );
        assert_eq!(payload.mutations[2], Mutation::Create(doc("c")));
    }

    #[test]
    fn build_does_not_drain() {
        let builder = MutationBuilder::new();
        builder.register("article", Mutation::Create(doc("a")));
        let _ = builder.build();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn scoped_view_counts_and_builds_only_its_tag() {
        let builder = MutationBuilder::new();
        builder.register("article", Mutation::Create(doc("a")));
        builder.register("author", Mutation::Create(doc("b")));
        builder.register("article", Mutation::Delete(DeleteById { id: "a".into() }));

        let articles = builder.for_tag("article");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles.build().len(), 2);
        assert_eq!(builder.for_tag("author").len(), 1);
        assert!(builder.for_tag("comment").is_empty());
    }

    #[test]
    fn scoped_clear_leaves_other_tags_in_order() {
        let builder = MutationBuilder::new();
        builder.register("article", Mutation::Create(doc("a1")));
        builder.register("author", Mutation::Create(doc("u1")));
        builder.register("article", Mutation::Create(doc("a2")));
        builder.register("author", Mutation::Create(doc("u2")));

        builder.for_tag("article").clear();

        let payload = builder.build();
        assert_eq!(
            payload.mutations,
            vec![Mutation::Create(doc("u1")), Mutation::Create(doc("u2"))],
        );
    }

    #[test]
    fn confirm_removes_only_the_snapshotted_prefix() {
        let builder = MutationBuilder::new();
        builder.register("article", Mutation::Create(doc("a1")));
        builder.register("article", Mutation::Create(doc("a2")));

        let (_, count) = builder.snapshot();
        // Registered while the commit is in flight.
        builder.register("author", Mutation::Create(doc("u1")));

        builder.confirm(count);
        let payload = builder.build();
        assert_eq!(payload.mutations, vec![Mutation::Create(doc("u1"))]);
    }

    #[test]
    fn confirm_for_removes_only_committed_entries_of_that_tag() {
        let builder = MutationBuilder::new();
        builder.register("article", Mutation::Create(doc("a1")));
        builder.register("author", Mutation::Create(doc("u1")));

        let (_, count) = builder.snapshot_for("article");
        builder.register("article", Mutation::Create(doc("a2")));

        builder.confirm_for("article", count);
        let payload = builder.build();
        assert_eq!(
            payload.mutations,
            vec![Mutation::Create(doc("u1")), Mutation::Create(doc("a2"))],
        );
    }

    #[test]
    fn mutation_wire_shapes() {
        let create = serde_json::to_value(Mutation::Create(doc("a"))).unwrap();
        assert_eq!(create, json!({ "create": { "_id": "a", "_type": "article" } }));

        let replace = serde_json::to_value(Mutation::CreateOrReplace(doc("a"))).unwrap();
        assert_eq!(
            replace,
            json!({ "createOrReplace": { "_id": "a", "_type": "article" } }),
        );

        let if_missing = serde_json::to_value(Mutation::CreateIfNotExists(doc("a"))).unwrap();
        assert_eq!(
            if_missing,
            json!({ "createIfNotExists": { "_id": "a", "_type": "article" } }),
        );

        let delete =
            serde_json::to_value(Mutation::Delete(DeleteById { id: "a".into() })).unwrap();
        assert_eq!(delete, json!({ "delete": { "id": "a" } }));
    }

    #[test]
    fn patch_wire_shape() {
        let patch = Patch::new("a")
            .set("title", json!("Updated"))
            .set_if_missing("draft", json!(false))
            .unset("legacyField");
        let value = serde_json::to_value(Mutation::Patch(patch)).unwrap();
        assert_eq!(
            value,
            json!({
                "patch": {
                    "id": "a",
                    "set": { "title": "Updated" },
                    "setIfMissing": { "draft": false },
                    "unset": ["legacyField"],
                }
            }),
        );
    }

    #[test]
    fn empty_patch_omits_sections() {
        let value = serde_json::to_value(Patch::new("a")).unwrap();
        assert_eq!(value, json!({ "id": "a" }));
    }
}
