use std::error::Error as StdError;
use thiserror::Error;

/// Result type alias for Events API operations
pub type Result<T> = std::result::Result<T, EventsError>;

/// Errors that can occur when building or sending events
///
/// Rate limiting (HTTP 403) is deliberately not here: it is reported as
/// [`SendOutcome::RateLimited`](crate::SendOutcome) so callers can apply
/// their own backoff.
#[derive(Debug, Error)]
pub enum EventsError {
    /// Malformed local input: empty routing key, unknown severity name,
    /// unusable proxy URL
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Failed to build HTTP client
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to serialize the event
    #[error("Failed to serialize event: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Network-layer failure: connection refused, timeout, TLS failure
    ///
    /// Boxed so that custom [`Transport`](crate::Transport) implementations
    /// can surface their own error types through it.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The server rejected the event (HTTP 400)
    #[error("Invalid event: {message}")]
    Validation {
        /// Error message from the server
        message: String,
        /// Per-field problems listed by the server
        errors: Vec<String>,
    },
}

impl EventsError {
    /// Check if the error is worth retrying
    ///
    /// Returns `true` only for transport-level connection and timeout
    /// failures. Configuration, serialization and validation errors will
    /// fail the same way on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(source) => {
                let mut cause: Option<&(dyn StdError + 'static)> = Some(&**source);
                while let Some(err) = cause {
                    // The middleware error's transparent variants forward
                    // source() past the inner reqwest::Error, so unwrap the
                    // wrapper itself instead of relying on the chain.
                    if let Some(reqwest_middleware::Error::Reqwest(err)) =
                        err.downcast_ref::<reqwest_middleware::Error>()
                    {
                        return err.is_connect() || err.is_timeout();
                    }
                    if let Some(err) = err.downcast_ref::<reqwest::Error>() {
                        return err.is_connect() || err.is_timeout();
                    }
                    cause = err.source();
                }
                false
            }
            _ => false,
        }
    }
}
