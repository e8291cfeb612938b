use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::errors::{EventsError, Result};
use crate::events::Event;
use crate::transport::{HttpTransport, Transport, TransportConfig, TransportResponse};

/// Default ingestion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://events.pagerduty.com/v2/enqueue";

/// Client for sending events to the ingestion endpoint
///
/// # Example
///
/// ```rust,no_run
/// use pagerduty_events::{EventsClient, Severity, TriggerEvent};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = EventsClient::new()?;
///
///     let event = TriggerEvent::new(
///         "your-32-char-integration-key",
///         "Disk is 99% full",
///         "db-01.acme.net",
///         Severity::Critical,
///     )?;
///
///     let outcome = client.send(event).await?;
///     if let Some(dedup_key) = outcome.dedup_key() {
///         println!("incident keyed by {dedup_key}");
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct EventsClient {
    transport: Arc<dyn Transport>,
    endpoint: Url,
}

impl EventsClient {
    /// Create a client with the default endpoint and transport settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a client with an explicit transport configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable or the HTTP
    /// client cannot be built.
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(HttpTransport::new(config)?),
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("Valid endpoint URL"),
        })
    }

    /// Create a client with a custom transport and endpoint.
    ///
    /// This allows substituting the whole delivery mechanism, for tests
    /// or for HTTP stacks this crate does not provide.
    pub fn with_transport(transport: Arc<dyn Transport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Override the ingestion endpoint.
    ///
    /// Useful for regional endpoints and for pointing tests at a local
    /// server.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Get the ingestion endpoint URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send a single event and interpret the server's response.
    ///
    /// Accepts any event type directly; there is no batching, the API
    /// takes one event per request.
    ///
    /// A rate-limited response (HTTP 403) is a [`SendOutcome`], not an
    /// error: the caller decides whether and when to retry. Statuses
    /// outside the documented set come back as
    /// [`SendOutcome::UnexpectedStatus`] for the same reason.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The event cannot be serialized
    /// - The HTTP request fails at the network layer
    /// - The server rejected the event as invalid (HTTP 400)
    pub async fn send(&self, event: impl Into<Event>) -> Result<SendOutcome> {
        self.send_event(event.into()).await
    }

    #[instrument(
        name = "EventsClient::send",
        skip_all,
        fields(action = %event.action())
    )]
    async fn send_event(&self, event: Event) -> Result<SendOutcome> {
        let body = serde_json::to_string(&event).map_err(EventsError::Serialize)?;

        debug!(url = %self.endpoint, "sending event");

        let response = self.transport.post_json(&self.endpoint, &body).await?;
        let outcome = interpret_response(response)?;

        debug!(accepted = outcome.is_accepted(), "event dispatched");
        Ok(outcome)
    }
}

/// Non-error result of a send.
///
/// Only an invalid event (HTTP 400) and network failures are errors;
/// everything else the server can answer is represented here so callers
/// can react without `match`ing on error types.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// The event was accepted for processing (HTTP 200 or 202).
    Accepted {
        /// Parsed response body; carries the server-assigned `dedup_key`.
        body: Value,
    },

    /// The server is rate limiting this routing key (HTTP 403).
    ///
    /// The event was not accepted. Slow down before retrying.
    RateLimited {
        /// Parsed response body
        body: Value,
    },

    /// Any status outside the documented set.
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Parsed response body
        body: Value,
    },
}

impl SendOutcome {
    /// Whether the event was accepted for processing.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Whether the server rate limited the request.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The parsed response body.
    ///
    /// [`Value::Null`] when the server sent no body or a non-JSON one.
    pub fn body(&self) -> &Value {
        match self {
            Self::Accepted { body }
            | Self::RateLimited { body }
            | Self::UnexpectedStatus { body, .. } => body,
        }
    }

    /// The `dedup_key` the server assigned to the event, if present.
    ///
    /// On an accepted trigger this is the key to acknowledge or resolve
    /// the incident with later.
    pub fn dedup_key(&self) -> Option<&str> {
        self.body().get("dedup_key").and_then(Value::as_str)
    }
}

/// Shape of an HTTP 400 response body.
#[derive(Debug, Default, Deserialize)]
struct RejectionBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

fn interpret_response(response: TransportResponse) -> Result<SendOutcome> {
    match response.status {
        200 | 202 => Ok(SendOutcome::Accepted {
            body: parse_body(&response.body),
        }),
        400 => {
            // Server rejections carry `message` and `errors` fields; keep
            // the raw text as the message when the body is something else.
            let rejection: RejectionBody =
                serde_json::from_str(&response.body).unwrap_or_default();
            Err(EventsError::Validation {
                message: rejection.message.unwrap_or(response.body),
                errors: rejection.errors,
            })
        }
        403 => Ok(SendOutcome::RateLimited {
            body: parse_body(&response.body),
        }),
        status => Ok(SendOutcome::UnexpectedStatus {
            status,
            body: parse_body(&response.body),
        }),
    }
}

fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}
