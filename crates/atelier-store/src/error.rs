use thiserror::Error;

/// A field-level rejection reported by the store (`userErrors`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending input, e.g. `"metaobject.fields.2.value"`.
    pub field: Option<String>,
    pub message: String,
    pub code: Option<String>,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {endpoint} (retry after {retry_after_secs}s)")]
    RateLimited {
        endpoint: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("store rejected {operation}: {}", join_field_errors(.errors))]
    Validation {
        operation: String,
        errors: Vec<FieldError>,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid store endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("pagination limit reached for {object_type}: exceeded {max_pages} pages")]
    PaginationLimit {
        object_type: String,
        max_pages: usize,
    },
}

impl StoreError {
    /// Returns `true` for transport-level failures a caller may retry.
    ///
    /// The store never retries on its own; this only classifies.
    ///
    /// Retryable: network failures, throttling (429 or a `THROTTLED` GraphQL
    /// error) and 5xx responses. Everything else, including
    /// [`StoreError::Validation`], fails the same way on every attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            StoreError::RateLimited { .. } => true,
            StoreError::UnexpectedStatus { status, .. } => *status >= 500,
            StoreError::GraphQl(_)
            | StoreError::Validation { .. }
            | StoreError::Deserialize { .. }
            | StoreError::InvalidEndpoint { .. }
            | StoreError::PaginationLimit { .. } => false,
        }
    }

    /// Field-level errors carried by a [`StoreError::Validation`], if any.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            StoreError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}
