//! Error types for the embedding client

/// Result type for embedding operations.
///
/// Convenience alias using [`EmbedError`] as the error type.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Error type for embedding-service calls.
///
/// Every failure mode surfaces here rather than being papered over: a caller
/// that cannot get real vectors must not receive fabricated ones, because a
/// zero or wrong-dimension vector would silently corrupt any index built from
/// the batch.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// The caller passed an empty batch; the service would reject it anyway.
    #[error("cannot embed an empty batch of texts")]
    EmptyBatch,

    /// The request never completed (connection refused, DNS, timeout).
    #[error("embedding request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status (rate limit, bad input).
    #[error("embedding service returned {status}: {message}")]
    ServiceStatus {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The service answered 2xx but the body did not match the expected shape.
    #[error("malformed embedding response: {message}")]
    InvalidResponse { message: String },

    /// Generic errors from other libraries.
    #[error("external error: {source}")]
    External {
        #[from]
        source: anyhow::Error,
    },
}

impl EmbedError {
    /// Create an invalid-response error with a custom message.
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
