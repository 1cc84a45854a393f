use atelier_store::StoreError;
use thiserror::Error;

/// Errors returned by catalog reads and writes.
///
/// A media reference that fails to resolve within the polling budget is not
/// an error: the affected operation succeeds with fewer images.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The store failed or rejected the request. Passed through unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An update carried no fields. Rejected before any store call.
    #[error("no fields provided for update of {handle}")]
    NoFieldsProvided { handle: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to encode field {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Returns `true` when the underlying store failure is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Store(e) if e.is_retryable())
    }
}
