//! Request and response types for bulk write operations.

use serde::Deserialize;
use serde_json::json;

/// One `index` action of a bulk request.
///
/// The source is kept pre-serialized so that it is encoded exactly once and its
/// size is known before the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOperation {
    /// The document id (`_id`). Indexing an existing id overwrites the document.
    pub document_id: String,
    /// The JSON document source.
    pub source: String,
}

impl BulkOperation {
    /// Create an `index` operation.
    pub fn index(document_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            source: source.into(),
        }
    }

    /// The NDJSON action line for this operation.
    pub fn action_line(&self) -> String {
        json!({ "index": { "_id": self.document_id } }).to_string()
    }

    /// Bytes this operation adds to a bulk request body, newlines included.
    pub fn encoded_len(&self) -> usize {
        self.action_line().len() + self.source.len() + 2
    }
}

/// Per-item outcome reported by the engine for a bulk request.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BulkItemResponse {
    #[serde(rename = "_id", default)]
    pub document_id: String,
    pub status: u16,
    /// `created` or `updated` on success.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<BulkErrorCause>,
}

impl BulkItemResponse {
    /// Whether the engine accepted this item.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Why the engine rejected an item.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BulkErrorCause {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of a `_bulk` response.
#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponseBody {
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<BulkActionResult>,
}

/// Each response item is keyed by the action that produced it.
#[derive(Debug, Deserialize)]
pub(crate) struct BulkActionResult {
    #[serde(alias = "create", alias = "update", alias = "delete")]
    pub index: BulkItemResponse,
}
