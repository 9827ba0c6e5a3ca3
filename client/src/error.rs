use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure classes of a single API call.
///
/// `Transient` and `RateLimited` are retried by the client; everything else is
/// returned to the caller on the first occurrence.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("BookStack rejected the API credentials (HTTP {status})")]
    Auth { status: u16 },
    #[error("resource not found")]
    NotFound,
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("rate limited by BookStack")]
    RateLimited { retry_after: Option<Duration> },
    #[error("cycle time budget exceeded")]
    BudgetExceeded,
    #[error("unexpected HTTP status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    Validation(String),
    /// The book exists in BookStack but is not on the requested shelf.
    #[error("book {book_id} was created but could not be added to shelf {shelf_id}: {source}")]
    BookNotShelved {
        book_id: u64,
        shelf_id: u64,
        source: Box<ApiError>,
    },
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transient(_) | ApiError::RateLimited { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidConfig(err.to_string())
        } else {
            // Timeouts, refused connections, resets and body read errors.
            ApiError::Transient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
