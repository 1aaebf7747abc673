//! Error taxonomy for the prediction client
//!
//! Every failure is classified at the point where it happens and returned
//! to the caller. Nothing in this crate retries; [`PredictError::is_retryable`]
//! tells the caller whether a retry could succeed without changing the request.

use std::fmt;

/// Result type for prediction client operations
pub type Result<T> = std::result::Result<T, PredictError>;

/// What went wrong below the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// Connection refused, reset, or DNS resolution failed
    Connect,
    /// The request did not complete before the timeout elapsed
    Timeout,
    /// Any other I/O failure while sending or reading the body
    Other,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportFailure::Connect => "connect",
            TransportFailure::Timeout => "timeout",
            TransportFailure::Other => "io",
        };
        f.write_str(s)
    }
}

/// Prediction client error types
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// Caller supplied an unusable payload or output configuration
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Modality tag is not one of text, image, video, audio, multimodal
    #[error("unsupported modality: {0}")]
    UnsupportedModality(String),

    /// Model URL or identifier triple cannot be turned into an endpoint
    #[error("malformed model reference: {0}")]
    MalformedReference(String),

    /// The request never produced an HTTP response
    #[error("transport error ({kind}): {message}")]
    Transport {
        kind: TransportFailure,
        message: String,
    },

    /// The service answered and rejected the request
    #[error("remote request failed (http {http_status}): {description}")]
    RemoteRequest {
        http_status: u16,
        /// Vendor status code from the response envelope, when present
        code: Option<u32>,
        description: String,
        details: Option<String>,
    },

    /// The response does not have the shape this client understands
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl PredictError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn malformed_reference(message: impl Into<String>) -> Self {
        Self::MalformedReference(message.into())
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Only transport failures may succeed when repeated unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, PredictError::Transport { .. })
    }

    /// Short label used for the `outcome` metric dimension and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::InvalidInput(_) => "invalid_input",
            PredictError::UnsupportedModality(_) => "unsupported_modality",
            PredictError::MalformedReference(_) => "malformed_reference",
            PredictError::Transport { .. } => "transport",
            PredictError::RemoteRequest { .. } => "remote",
            PredictError::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Connect
        } else {
            TransportFailure::Other
        };

        PredictError::Transport {
            kind,
            message: err.to_string(),
        }
    }
}
