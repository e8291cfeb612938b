//! # PagerDuty Events
//!
//! A Rust client library for the [PagerDuty Events API v2](https://developer.pagerduty.com/docs/events-api-v2/overview/):
//! trigger, acknowledge, and resolve incidents from monitoring code.
//!
//! ## Features
//!
//! - Typed trigger, acknowledge, and resolve events with builder-style setters
//! - Deduplication key handling, including derivation from the summary
//! - Rate limiting surfaced as an outcome instead of an error
//! - Pluggable transport with explicit timeout, proxy, and user-agent settings
//!
//! ## Example
//!
//! ```rust,no_run
//! use pagerduty_events::{EventsClient, Link, Severity, TriggerEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EventsClient::new()?;
//!
//!     let event = TriggerEvent::new(
//!         "your-32-char-integration-key",
//!         "Disk is 99% full",
//!         "db-01.acme.net",
//!         Severity::Critical,
//!     )?
//!     .with_component("postgres")
//!     .with_group("databases")
//!     .with_dedup_key("disk-db-01")
//!     .with_link(Link::new("https://grafana.acme.net/d/disk").with_text("Disk dashboard"));
//!
//!     let outcome = client.send(event).await?;
//!     if outcome.is_rate_limited() {
//!         eprintln!("throttled, try again later");
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod errors;
mod events;
mod transport;

pub use client::{EventsClient, SendOutcome, DEFAULT_ENDPOINT};
pub use errors::{EventsError, Result};
pub use events::{
    AcknowledgeEvent, Event, EventAction, Image, Link, Payload, ResolveEvent, Severity,
    TriggerEvent, DEDUP_KEY_MAX_CHARS,
};
pub use transport::{
    HttpTransport, Transport, TransportConfig, TransportResponse, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
