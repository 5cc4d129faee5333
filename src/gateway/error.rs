//! Gateway error type.
//!
//! Every upstream failure is normalized into [`GatewayError`]. The
//! `Display` output is the human-readable message shown to callers, built
//! with the priority: upstream payload message, then transport error
//! message, then [`GENERIC_FAILURE`]. The enum variant is the kind
//! discriminant layers above can branch on.

use thiserror::Error;

/// Fallback message when neither the upstream payload nor the transport
/// layer provides one.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Upstream rejected the bearer token (HTTP 401). Raising this also
    /// cleared the client's bearer slot.
    #[error("{0}")]
    Unauthorized(String),

    /// The request exceeded the configured timeout.
    #[error("{0}")]
    Timeout(String),

    /// Network-level failure before a response arrived.
    #[error("{0}")]
    Transport(String),

    /// Upstream answered with `success: false` or a non-2xx status.
    #[error("{message}")]
    Upstream {
        /// HTTP status, when the failure came with one.
        status: Option<u16>,
        message: String,
    },

    /// Input rejected locally; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Response body did not match the expected envelope.
    #[error("{0}")]
    Decode(String),
}

impl GatewayError {
    /// True when the upstream rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized(_))
    }

    /// The normalized human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
