//! HTTP delivery for serialized events.
//!
//! The client talks to the ingestion endpoint through the [`Transport`]
//! trait so the HTTP stack can be swapped out without touching event or
//! dispatch logic. [`HttpTransport`] is the reqwest-backed implementation
//! used by default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tracing::debug;
use url::Url;

use crate::errors::{EventsError, Result};

/// Default overall request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("pagerduty-events/", env!("CARGO_PKG_VERSION"));

/// Status code and raw body of a completed HTTP exchange.
///
/// Interpreting the status (accepted, invalid, rate limited) is the
/// dispatcher's job, not the transport's.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

/// Delivery mechanism for serialized events.
///
/// Implementations POST a JSON document and report whatever came back.
/// They must not interpret the response and must not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` as `application/json`.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Transport`] when the exchange fails at the
    /// network layer (connection refused, timeout, TLS failure).
    async fn post_json(&self, url: &Url, body: &str) -> Result<TransportResponse>;
}

/// Configuration for [`HttpTransport`].
///
/// Passed explicitly to the constructor; there are no process-wide
/// defaults to mutate.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pagerduty_events::TransportConfig;
///
/// let config = TransportConfig::default()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("acme-monitor/2.1");
/// ```
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Overall request timeout. Defaults to 60 seconds.
    pub timeout: Duration,

    /// Connection timeout. Defaults to 10 seconds.
    pub connect_timeout: Duration,

    /// `User-Agent` header value. Defaults to `pagerduty-events/<version>`.
    pub user_agent: String,

    /// Optional proxy for all requests.
    pub proxy: Option<Url>,

    /// Skip TLS certificate verification. Defaults to `false`; only
    /// meant for talking to self-signed test endpoints.
    #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
    pub danger_accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
            danger_accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    /// Set the overall request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Set the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Route requests through the given proxy.
    pub fn with_proxy(mut self, proxy: Url) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Skip TLS certificate verification.
    #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
    pub fn with_danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }
}

/// Reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
}

impl HttpTransport {
    /// Build a transport from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Configuration`] for an unusable proxy URL,
    /// or [`EventsError::BuildHttpClient`] if the underlying client cannot
    /// be constructed.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url.clone()).map_err(|e| {
                EventsError::Configuration(format!("invalid proxy {proxy_url}: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }

        #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
        if config.danger_accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(EventsError::BuildHttpClient)?;

        Ok(Self {
            client: ClientBuilder::new(client).build(),
        })
    }

    /// Wrap a caller-supplied middleware client.
    ///
    /// This allows custom middleware (retry, logging, etc.) on the
    /// underlying HTTP stack; timeouts then come from that client, not
    /// from a [`TransportConfig`].
    pub fn with_client(client: ClientWithMiddleware) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &Url, body: &str) -> Result<TransportResponse> {
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await
            .map_err(|e| EventsError::Transport(Box::new(e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| EventsError::Transport(Box::new(e)))?;

        debug!(status, "response received");

        Ok(TransportResponse { status, body })
    }
}
