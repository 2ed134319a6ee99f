//! Built-in document types backing the context's convenience sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;

/// Reserved type tag of the untyped [`RawDocument`] set.
pub const RAW_DOCUMENT_TYPE: &str = "document";
/// Type tag image assets carry on the remote.
pub const IMAGE_ASSET_TYPE: &str = "system.imageAsset";
/// Type tag file assets carry on the remote.
pub const FILE_ASSET_TYPE: &str = "system.fileAsset";

/// A schemaless document: identifier, type discriminator, and whatever
/// other fields the body carries.
///
/// The raw set is mainly a staging surface for heterogeneous writes; reads
/// through it are scoped to the reserved `"document"` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawDocument {
    /// Creates an empty document with the given id and type discriminator.
    pub fn new(id: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc_type: doc_type.into(),
            fields: Map::new(),
        }
    }

    /// Adds a field to the body.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

impl Document for RawDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn document_type() -> &'static str {
        RAW_DOCUMENT_TYPE
    }
}

fn image_asset_type() -> String {
    IMAGE_ASSET_TYPE.to_string()
}

fn file_asset_type() -> String {
    FILE_ASSET_TYPE.to_string()
}

/// An uploaded image known to the remote's asset pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type", default = "image_asset_type")]
    pub doc_type: String,
    /// Public URL the asset is served from.
    pub url: String,
    #[serde(rename = "originalFilename", skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "_createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Document for ImageAsset {
    fn id(&self) -> &str {
        &self.id
    }

    fn document_type() -> &'static str {
        IMAGE_ASSET_TYPE
    }
}

/// An uploaded file known to the remote's asset pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAsset {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type", default = "file_asset_type")]
    pub doc_type: String,
    /// Public URL the asset is served from.
    pub url: String,
    #[serde(rename = "originalFilename", skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "_createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Document for FileAsset {
    fn id(&self) -> &str {
        &self.id
    }

    fn document_type() -> &'static str {
        FILE_ASSET_TYPE
    }
}
