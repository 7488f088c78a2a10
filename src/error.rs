//! Error taxonomy for AxonFlow API calls with retryable/terminal classification.

use reqwest::StatusCode;

/// Errors surfaced by the AxonFlow client.
///
/// Every variant carries a fixed retryable/terminal classification consumed
/// by the retry executor; see [`Error::is_retryable`].
#[derive(Debug)]
pub enum Error {
    /// Request or gateway timeout (HTTP 408 or a transport-level timeout).
    Timeout(String),
    /// Rate limit exceeded (HTTP 429).
    RateLimited(String),
    /// Server-side failure (HTTP 5xx).
    Server { status: u16, message: String },
    /// Transport-level failure (connect error, connection reset, DNS).
    Connection(String),
    /// Authentication failed (HTTP 401).
    AuthenticationFailed(String),
    /// Forbidden access (HTTP 403, non-policy).
    Forbidden(String),
    /// The governance service blocked the request.
    PolicyBlocked { reason: String },
    /// Resource not found (HTTP 404).
    NotFound(String),
    /// Malformed request or invalid parameters (HTTP 400/422, config errors).
    Validation(String),
    /// JSON encode/decode failure.
    Serialization(String),
}

impl Error {
    /// Returns true for transient failures that may succeed on retry.
    ///
    /// Retryable: timeouts, rate limits, 5xx responses, transport failures.
    /// Everything else is terminal and must propagate unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::RateLimited(_) | Error::Server { .. } | Error::Connection(_)
        )
    }

    /// Maps an HTTP status code and response message into a classified error.
    pub fn from_status(status: StatusCode, message: String) -> Error {
        match status {
            StatusCode::UNAUTHORIZED => Error::AuthenticationFailed(message),
            StatusCode::FORBIDDEN => Error::Forbidden(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::REQUEST_TIMEOUT => Error::Timeout(message),
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
            s if s.is_client_error() => Error::Validation(message),
            s => Error::Server {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Maps a transport-level reqwest error into a classified error.
    pub fn from_reqwest(error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout(error.to_string())
        } else if error.is_decode() {
            Error::Serialization(error.to_string())
        } else {
            // Connect failures, resets, DNS errors and anything else at the
            // transport layer are transient.
            Error::Connection(error.to_string())
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Timeout(msg) => {
                write!(f, "Request timed out: {}", msg)
            }
            Error::RateLimited(msg) => {
                write!(f, "Rate limit exceeded: {}. Try again later.", msg)
            }
            Error::Server { status, message } => {
                write!(f, "Server error (HTTP {}): {}", status, message)
            }
            Error::Connection(msg) => {
                write!(f, "Connection failed: {}", msg)
            }
            Error::AuthenticationFailed(msg) => {
                write!(
                    f,
                    "Authentication failed: {}. Check your AXONFLOW_API_KEY.",
                    msg
                )
            }
            Error::Forbidden(msg) => {
                write!(f, "Access forbidden: {}", msg)
            }
            Error::PolicyBlocked { reason } => {
                write!(f, "Request blocked by policy: {}", reason)
            }
            Error::NotFound(msg) => {
                write!(f, "Not found: {}", msg)
            }
            Error::Validation(msg) => {
                write!(f, "Invalid request: {}", msg)
            }
            Error::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias used throughout the SDK.
pub type Result<T> = std::result::Result<T, Error>;
