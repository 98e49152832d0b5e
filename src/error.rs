use crate::ValidationError;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("Request failed with status {status}")]
    Status { status: u16, body: String },
    /// Body declared as JSON could not be parsed.
    #[error("decode error: {0}")]
    Decode(String),
    /// Decoded body was rejected by the request validator.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Request URL could not be resolved.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// The whole retry sequence ran past the configured deadline.
    #[error("deadline of {deadline_ms} ms exceeded")]
    DeadlineExceeded { deadline_ms: u64 },
    #[error("Unknown fetch error")]
    Unknown,
}

impl ApiError {
    /// HTTP status code, when the failure was a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
