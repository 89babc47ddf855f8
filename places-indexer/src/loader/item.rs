//! Items submitted to the bulk indexer.

use std::fmt;

use places_indexer_repository::{BulkItemResponse, BulkOperation, SearchIndexError};
use places_indexer_shared::PlaceDocument;

use crate::errors::{BulkItemError, IngestError};

/// Called once when the engine accepted the document.
pub type SuccessCallback = Box<dyn FnOnce(&BulkItemResponse) + Send>;

/// Called once when the document could not be indexed.
pub type FailureCallback = Box<dyn FnOnce(&BulkItemError) + Send>;

/// One `index` action together with its completion callbacks.
pub struct BulkIndexerItem {
    operation: BulkOperation,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl BulkIndexerItem {
    /// Create an item from an already serialized document source.
    pub fn new(document_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            operation: BulkOperation::index(document_id, source),
            on_success: None,
            on_failure: None,
        }
    }

    /// Create an item for `document`, keyed by its id.
    ///
    /// The document is serialized here, once, so the item's size is exact.
    pub fn from_document(document: &PlaceDocument) -> Result<Self, IngestError> {
        let source = document.to_source().map_err(|e| {
            SearchIndexError::serialization(format!(
                "failed to serialize document '{}': {}",
                document.document_id(),
                e
            ))
        })?;
        Ok(Self::new(document.document_id(), source))
    }

    /// Set the callback invoked when the document is indexed.
    pub fn on_success(mut self, callback: impl FnOnce(&BulkItemResponse) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Set the callback invoked when the document fails.
    pub fn on_failure(mut self, callback: impl FnOnce(&BulkItemError) + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(callback));
        self
    }

    pub fn document_id(&self) -> &str {
        &self.operation.document_id
    }

    /// Bytes this item adds to a bulk request.
    pub fn size(&self) -> usize {
        self.operation.encoded_len()
    }

    pub(crate) fn into_parts(self) -> (BulkOperation, ItemCallbacks) {
        (
            self.operation,
            ItemCallbacks {
                on_success: self.on_success,
                on_failure: self.on_failure,
            },
        )
    }
}

impl fmt::Debug for BulkIndexerItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkIndexerItem")
            .field("document_id", &self.operation.document_id)
            .field("size", &self.size())
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// Callbacks detached from an item once its operation is handed to the engine.
pub(crate) struct ItemCallbacks {
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl ItemCallbacks {
    pub(crate) fn succeed(self, response: &BulkItemResponse) {
        if let Some(callback) = self.on_success {
            callback(response);
        }
    }

    pub(crate) fn fail(self, error: &BulkItemError) {
        if let Some(callback) = self.on_failure {
            callback(error);
        }
    }
}

impl From<&BulkItemResponse> for BulkItemError {
    fn from(response: &BulkItemResponse) -> Self {
        let (error_type, reason) = match &response.error {
            Some(cause) => (
                cause.error_type.clone(),
                cause.reason.clone().unwrap_or_default(),
            ),
            None => ("unexpected_status".to_string(), String::new()),
        };
        Self::Rejected {
            status: response.status,
            error_type,
            reason,
        }
    }
}
