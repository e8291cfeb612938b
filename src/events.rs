use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::{EventsError, Result};

/// Maximum length of a dedup key, in characters.
///
/// The ingestion API caps `dedup_key` at 255 characters. Longer keys are
/// truncated to the cap, not rejected.
pub const DEDUP_KEY_MAX_CHARS: usize = 255;

/// The event's verb: open, acknowledge or resolve an incident.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Trigger,
    Acknowledge,
    Resolve,
}

impl Display for EventAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Trigger => write!(f, "trigger"),
            EventAction::Acknowledge => write!(f, "acknowledge"),
            EventAction::Resolve => write!(f, "resolve"),
        }
    }
}

/// Severity of the condition reported by a trigger event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl FromStr for Severity {
    type Err = EventsError;

    /// Parse a severity name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(EventsError::Configuration(format!(
                "unknown severity `{s}`, expected one of critical, error, warning, info"
            ))),
        }
    }
}

/// A link attached to a trigger event, shown on the incident.
///
/// See: <https://developer.pagerduty.com/docs/events-api-v2/trigger-events/#the-links-property>
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Link {
    /// URL of the link.
    pub href: String,

    /// Plain text describing the purpose of the link; used as the link's
    /// text in the incident view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Link {
    /// Create a link to the given URL.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: None,
        }
    }

    /// Set the link text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// An image attached to a trigger event, shown on the incident.
///
/// See: <https://developer.pagerduty.com/docs/events-api-v2/trigger-events/#the-images-property>
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Image {
    /// Source URL of the image. Must be served via HTTPS.
    pub src: String,

    /// Optional URL; makes the image a clickable link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Optional alternative text for the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl Image {
    /// Create an image with the given source URL.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            href: None,
            alt: None,
        }
    }

    /// Make the image a clickable link to `href`.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the alternative text.
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// Structured description of the failure carried by a trigger event.
///
/// `summary`, `source` and `severity` are required and set by
/// [`TriggerEvent::new`]; the rest is optional and absent from the
/// serialized event until set through the trigger's setters. Optional
/// fields are never serialized as null. Read-only outside the event.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    summary: String,
    source: String,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_details: Option<serde_json::Value>,
}

impl Payload {
    /// A human-readable error message. This is what PagerDuty will read
    /// over the phone.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The unique location of the affected system, preferably a hostname
    /// or FQDN.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Severity of the reported condition.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The time the condition occurred. Serialized as RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Component of the source machine responsible for the event, for
    /// example `mysql` or `eth0`.
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// Logical grouping of components of a service, for example
    /// `app-stack`.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The class/type of the event, for example `ping failure` or
    /// `cpu load`.
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Free-form details about the event and affected system, displayed
    /// alongside the incident. Useful for debugging.
    pub fn custom_details(&self) -> Option<&serde_json::Value> {
        self.custom_details.as_ref()
    }
}

/// A `trigger` event: opens a new incident, or feeds an existing one when
/// the dedup key matches an open incident.
///
/// # Example
///
/// ```rust
/// use pagerduty_events::{Link, Severity, TriggerEvent};
///
/// let event = TriggerEvent::new("sv123", "Disk is full", "db01.acme.com", Severity::Critical)?
///     .with_component("mysql")
///     .with_custom_details(serde_json::json!({ "free_bytes": 0 }))
///     .with_link(Link::new("https://grafana.acme.com/d/disk").with_text("Disk dashboard"));
/// # Ok::<(), pagerduty_events::EventsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    routing_key: String,
    payload: Payload,
    dedup_key: Option<String>,
    links: Vec<Link>,
    images: Vec<Image>,
    auto_dedup_key: bool,
}

impl TriggerEvent {
    /// Create a new trigger event.
    ///
    /// # Arguments
    ///
    /// * `routing_key` - The integration/routing key of the target service
    /// * `summary` - The error message
    /// * `source` - The unique location of the affected system
    /// * `severity` - Severity of the condition
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Configuration`] if `routing_key` is empty.
    pub fn new(
        routing_key: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
        severity: Severity,
    ) -> Result<Self> {
        Ok(Self {
            routing_key: validate_routing_key(routing_key.into())?,
            payload: Payload {
                summary: summary.into(),
                source: source.into(),
                severity,
                timestamp: None,
                component: None,
                group: None,
                class: None,
                custom_details: None,
            },
            dedup_key: None,
            links: Vec::new(),
            images: Vec::new(),
            auto_dedup_key: false,
        })
    }

    /// Set the dedup key used for incident grouping.
    ///
    /// Subsequent events with the same key are applied to the open incident
    /// matching it. Keys longer than 255 characters are truncated, not
    /// rejected. When no key is sent at all, the server generates one and
    /// returns it in the accepted response.
    pub fn with_dedup_key(mut self, dedup_key: impl Into<String>) -> Self {
        self.dedup_key = Some(clamp_dedup_key(dedup_key.into()));
        self
    }

    /// Derive the dedup key from the summary instead of tracking one.
    ///
    /// On serialization the event carries
    /// `dedup_key = "md5-" + md5(payload.summary)`, overriding any key set
    /// with [`with_dedup_key`](Self::with_dedup_key). Repeated identical
    /// alerts then collapse into one incident without caller bookkeeping.
    ///
    /// The digest is taken from the summary current at serialization time:
    /// replacing the summary afterwards (via
    /// [`with_summary`](Self::with_summary)) changes the derived key too.
    pub fn with_auto_dedup_key(mut self) -> Self {
        self.auto_dedup_key = true;
        self
    }

    /// Replace the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.payload.summary = summary.into();
        self
    }

    /// Replace the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.payload.source = source.into();
        self
    }

    /// Replace the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.payload.severity = severity;
        self
    }

    /// Set the time the condition occurred.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.payload.timestamp = Some(timestamp);
        self
    }

    /// Set the affected component, for example `mysql` or `eth0`.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.payload.component = Some(component.into());
        self
    }

    /// Set the logical component grouping, for example `app-stack`.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.payload.group = Some(group.into());
        self
    }

    /// Set the event class, for example `ping failure` or `cpu load`.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.payload.class = Some(class.into());
        self
    }

    /// Attach free-form details to the event.
    pub fn with_custom_details(mut self, details: serde_json::Value) -> Self {
        self.payload.custom_details = Some(details);
        self
    }

    /// Attach a link to the incident.
    ///
    /// Links are serialized in insertion order.
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Attach an image to the incident.
    ///
    /// Images are serialized in insertion order.
    pub fn with_image(mut self, image: Image) -> Self {
        self.images.push(image);
        self
    }

    /// The routing key this event is addressed to.
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// Always [`EventAction::Trigger`].
    pub fn action(&self) -> EventAction {
        EventAction::Trigger
    }

    /// The explicitly set dedup key, if any.
    ///
    /// Auto-derivation happens during serialization and is not reflected
    /// here.
    pub fn dedup_key(&self) -> Option<&str> {
        self.dedup_key.as_deref()
    }

    /// The trigger payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Links attached so far, in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Images attached so far, in insertion order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// The dedup key that serialization will emit right now.
    fn effective_dedup_key(&self) -> Option<Cow<'_, str>> {
        if self.auto_dedup_key {
            Some(Cow::Owned(summary_dedup_key(&self.payload.summary)))
        } else {
            self.dedup_key.as_deref().map(Cow::Borrowed)
        }
    }
}

// Hand-written so the auto dedup key is computed from the live summary and
// empty links/images stay off the wire. Serializing never mutates the event;
// repeated calls yield identical output.
impl Serialize for TriggerEvent {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("routing_key", &self.routing_key)?;
        map.serialize_entry("event_action", &EventAction::Trigger)?;
        if let Some(dedup_key) = self.effective_dedup_key() {
            map.serialize_entry("dedup_key", &*dedup_key)?;
        }
        map.serialize_entry("payload", &self.payload)?;
        if !self.links.is_empty() {
            map.serialize_entry("links", &self.links)?;
        }
        if !self.images.is_empty() {
            map.serialize_entry("images", &self.images)?;
        }
        map.end()
    }
}

/// An `acknowledge` event: marks the incident identified by the dedup key
/// as being worked on.
///
/// Once the incident is resolved, further acknowledge events with the same
/// key are dropped by the server.
#[derive(Debug, Clone, Serialize)]
pub struct AcknowledgeEvent {
    routing_key: String,
    event_action: EventAction,
    dedup_key: String,
}

impl AcknowledgeEvent {
    /// Create an acknowledge event for the incident identified by
    /// `dedup_key`.
    ///
    /// The key is truncated to 255 characters, like everywhere else.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Configuration`] if `routing_key` is empty.
    pub fn new(routing_key: impl Into<String>, dedup_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            routing_key: validate_routing_key(routing_key.into())?,
            event_action: EventAction::Acknowledge,
            dedup_key: clamp_dedup_key(dedup_key.into()),
        })
    }

    /// The routing key this event is addressed to.
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// Always [`EventAction::Acknowledge`].
    pub fn action(&self) -> EventAction {
        self.event_action
    }

    /// The dedup key of the incident being acknowledged.
    pub fn dedup_key(&self) -> &str {
        &self.dedup_key
    }
}

/// A `resolve` event: closes the incident identified by the dedup key.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveEvent {
    routing_key: String,
    event_action: EventAction,
    dedup_key: String,
}

impl ResolveEvent {
    /// Create a resolve event for the incident identified by `dedup_key`.
    ///
    /// The key is truncated to 255 characters, like everywhere else.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Configuration`] if `routing_key` is empty.
    pub fn new(routing_key: impl Into<String>, dedup_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            routing_key: validate_routing_key(routing_key.into())?,
            event_action: EventAction::Resolve,
            dedup_key: clamp_dedup_key(dedup_key.into()),
        })
    }

    /// The routing key this event is addressed to.
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// Always [`EventAction::Resolve`].
    pub fn action(&self) -> EventAction {
        self.event_action
    }

    /// The dedup key of the incident being resolved.
    pub fn dedup_key(&self) -> &str {
        &self.dedup_key
    }
}

/// Any event acceptable to [`EventsClient::send`](crate::EventsClient::send).
///
/// All three concrete event types convert into this via `From`, so callers
/// normally never name it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Event {
    Trigger(TriggerEvent),
    Acknowledge(AcknowledgeEvent),
    Resolve(ResolveEvent),
}

impl Event {
    /// The action this event performs.
    pub fn action(&self) -> EventAction {
        match self {
            Event::Trigger(_) => EventAction::Trigger,
            Event::Acknowledge(_) => EventAction::Acknowledge,
            Event::Resolve(_) => EventAction::Resolve,
        }
    }

    /// The routing key this event is addressed to.
    pub fn routing_key(&self) -> &str {
        match self {
            Event::Trigger(event) => event.routing_key(),
            Event::Acknowledge(event) => event.routing_key(),
            Event::Resolve(event) => event.routing_key(),
        }
    }

    /// The dedup key stored on the event, if any.
    pub fn dedup_key(&self) -> Option<&str> {
        match self {
            Event::Trigger(event) => event.dedup_key(),
            Event::Acknowledge(event) => Some(event.dedup_key()),
            Event::Resolve(event) => Some(event.dedup_key()),
        }
    }
}

impl From<TriggerEvent> for Event {
    fn from(event: TriggerEvent) -> Self {
        Event::Trigger(event)
    }
}

impl From<AcknowledgeEvent> for Event {
    fn from(event: AcknowledgeEvent) -> Self {
        Event::Acknowledge(event)
    }
}

impl From<ResolveEvent> for Event {
    fn from(event: ResolveEvent) -> Self {
        Event::Resolve(event)
    }
}

fn validate_routing_key(routing_key: String) -> Result<String> {
    if routing_key.is_empty() {
        return Err(EventsError::Configuration(
            "routing key must not be empty".to_string(),
        ));
    }
    Ok(routing_key)
}

/// Truncate a key to the 255-character cap, on character boundaries.
fn clamp_dedup_key(mut key: String) -> String {
    if let Some((idx, _)) = key.char_indices().nth(DEDUP_KEY_MAX_CHARS) {
        key.truncate(idx);
    }
    key
}

/// Dedup key derived from a trigger summary: `md5-` plus the lowercase hex
/// digest of the summary.
fn summary_dedup_key(summary: &str) -> String {
    format!("md5-{}", hex::encode(Md5::digest(summary.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn trigger(summary: &str) -> TriggerEvent {
        TriggerEvent::new("sv123", summary, "localhost", Severity::Error).unwrap()
    }

    #[test]
    fn test_acknowledge_serialization() {
        let event = AcknowledgeEvent::new("sv123", "inc123").unwrap();

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "routing_key": "sv123",
                "event_action": "acknowledge",
                "dedup_key": "inc123",
            })
        );
    }

    #[test]
    fn test_resolve_serialization() {
        let event = ResolveEvent::new("sv123", "inc123").unwrap();

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "routing_key": "sv123",
                "event_action": "resolve",
                "dedup_key": "inc123",
            })
        );
    }

    #[test]
    fn test_empty_routing_key_rejected() {
        assert!(matches!(
            TriggerEvent::new("", "Blah", "localhost", Severity::Info),
            Err(EventsError::Configuration(_))
        ));
        assert!(matches!(
            AcknowledgeEvent::new("", "inc123"),
            Err(EventsError::Configuration(_))
        ));
        assert!(matches!(
            ResolveEvent::new("", "inc123"),
            Err(EventsError::Configuration(_))
        ));
    }

    #[test]
    fn test_dedup_key_truncated_to_255_chars() {
        let long = "k".repeat(300);

        let event = ResolveEvent::new("sv123", long.clone()).unwrap();
        assert_eq!(event.dedup_key(), &long[..255]);

        let event = trigger("Blah").with_dedup_key(long);
        assert_eq!(event.dedup_key().unwrap().len(), 255);
    }

    #[test]
    fn test_dedup_key_truncation_counts_characters_not_bytes() {
        let event = AcknowledgeEvent::new("sv123", "é".repeat(300)).unwrap();

        assert_eq!(event.dedup_key().chars().count(), 255);
        assert!(event.dedup_key().chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_dedup_key_at_cap_kept_verbatim() {
        let exact = "k".repeat(255);
        let event = AcknowledgeEvent::new("sv123", exact.clone()).unwrap();

        assert_eq!(event.dedup_key(), exact);
    }

    #[test]
    fn test_trigger_minimal_serialization() {
        let value = serde_json::to_value(trigger("Blah")).unwrap();

        // Unset optionals are absent, not null or empty arrays.
        assert_eq!(
            value,
            json!({
                "routing_key": "sv123",
                "event_action": "trigger",
                "payload": {
                    "summary": "Blah",
                    "source": "localhost",
                    "severity": "error",
                },
            })
        );
        assert!(!value.as_object().unwrap().contains_key("dedup_key"));
    }

    #[test]
    fn test_trigger_full_serialization() {
        let event = TriggerEvent::new(
            "sv123",
            "FAILURE for production/HTTP on srv01",
            "localhost",
            Severity::Error,
        )
        .unwrap()
        .with_class("ping failure")
        .with_component("web server")
        .with_group("app-stack")
        .with_custom_details(json!({ "ping_time": "1500ms", "load_avg": 0.75 }))
        .with_link(Link::new("http://x"))
        .with_link(Link::new("http://x").with_text("text"))
        .with_image(Image::new("http://img"));

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "routing_key": "sv123",
                "event_action": "trigger",
                "payload": {
                    "summary": "FAILURE for production/HTTP on srv01",
                    "source": "localhost",
                    "severity": "error",
                    "component": "web server",
                    "group": "app-stack",
                    "class": "ping failure",
                    "custom_details": { "ping_time": "1500ms", "load_avg": 0.75 },
                },
                "links": [
                    { "href": "http://x" },
                    { "href": "http://x", "text": "text" },
                ],
                "images": [
                    { "src": "http://img" },
                ],
            })
        );
    }

    #[test]
    fn test_trigger_timestamp_serializes_rfc3339() {
        use chrono::TimeZone;

        let timestamp = Utc.with_ymd_and_hms(2018, 5, 1, 8, 42, 58).unwrap();
        let value = serde_json::to_value(trigger("Blah").with_timestamp(timestamp)).unwrap();

        assert_eq!(value["payload"]["timestamp"], json!("2018-05-01T08:42:58Z"));
    }

    #[test]
    fn test_auto_dedup_key_derivation() {
        // RFC 1321 test vector: md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        let value = serde_json::to_value(trigger("abc").with_auto_dedup_key()).unwrap();

        assert_eq!(
            value["dedup_key"],
            json!("md5-900150983cd24fb0d6963f7d28e17f72")
        );
    }

    #[test]
    fn test_auto_dedup_key_overrides_explicit_key() {
        let event = trigger("abc").with_dedup_key("explicit").with_auto_dedup_key();

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value["dedup_key"],
            json!("md5-900150983cd24fb0d6963f7d28e17f72")
        );
        // The stored key is untouched; only the serialized form is derived.
        assert_eq!(event.dedup_key(), Some("explicit"));
    }

    #[test]
    fn test_auto_dedup_key_follows_summary_mutation() {
        let event = trigger("abc").with_auto_dedup_key();
        let before = serde_json::to_value(&event).unwrap();

        let event = event.with_summary("message digest");
        let after = serde_json::to_value(&event).unwrap();

        assert_ne!(before["dedup_key"], after["dedup_key"]);
        // RFC 1321: md5("message digest") = f96b697d7cb7938d525a2f31aaf161d0
        assert_eq!(
            after["dedup_key"],
            json!("md5-f96b697d7cb7938d525a2f31aaf161d0")
        );
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let event = trigger("Disk full")
            .with_auto_dedup_key()
            .with_link(Link::new("http://x"));

        let first = serde_json::to_string(&event).unwrap();
        let second = serde_json::to_string(&event).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_event_enum_serializes_like_inner() {
        let ack = AcknowledgeEvent::new("sv123", "inc123").unwrap();
        let event = Event::from(ack.clone());

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::to_value(&ack).unwrap()
        );
        assert_eq!(event.action(), EventAction::Acknowledge);
        assert_eq!(event.routing_key(), "sv123");
        assert_eq!(event.dedup_key(), Some("inc123"));
    }

    #[test]
    fn test_trigger_event_accessors() {
        let event = trigger("Blah").with_link(Link::new("http://x"));

        assert_eq!(event.routing_key(), "sv123");
        assert_eq!(event.action(), EventAction::Trigger);
        assert_eq!(event.dedup_key(), None);
        assert_eq!(event.payload().summary(), "Blah");
        assert_eq!(event.payload().severity(), Severity::Error);
        assert_eq!(event.links(), [Link::new("http://x")]);
        assert!(event.images().is_empty());
    }

    #[test]
    fn test_payload_accessors() {
        use chrono::TimeZone;

        let timestamp = Utc.with_ymd_and_hms(2018, 5, 1, 8, 42, 58).unwrap();
        let event = trigger("Blah")
            .with_timestamp(timestamp)
            .with_component("mysql")
            .with_group("databases")
            .with_class("disk usage")
            .with_custom_details(json!({ "free_bytes": 0 }));

        let payload = event.payload();
        assert_eq!(payload.summary(), "Blah");
        assert_eq!(payload.source(), "localhost");
        assert_eq!(payload.severity(), Severity::Error);
        assert_eq!(payload.timestamp(), Some(timestamp));
        assert_eq!(payload.component(), Some("mysql"));
        assert_eq!(payload.group(), Some("databases"));
        assert_eq!(payload.class(), Some("disk usage"));
        assert_eq!(payload.custom_details(), Some(&json!({ "free_bytes": 0 })));
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Critical.to_string(), "critical");
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert!(matches!(
            "fatal".parse::<Severity>(),
            Err(EventsError::Configuration(_))
        ));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(EventAction::Trigger.to_string(), "trigger");
        assert_eq!(EventAction::Acknowledge.to_string(), "acknowledge");
        assert_eq!(EventAction::Resolve.to_string(), "resolve");
    }

    #[test]
    fn test_attachment_equality_is_structural() {
        assert_eq!(
            Link::new("http://x").with_text("text"),
            Link::new("http://x").with_text("text")
        );
        assert_ne!(Link::new("http://x"), Link::new("http://y"));

        assert_eq!(
            Image::new("http://img").with_href("http://x").with_alt("chart"),
            Image::new("http://img").with_href("http://x").with_alt("chart")
        );
        assert_ne!(Image::new("http://img"), Image::new("http://img").with_alt("chart"));
    }

    #[test]
    fn test_attachment_optionals_absent_when_unset() {
        assert_eq!(
            serde_json::to_value(Link::new("http://x")).unwrap(),
            json!({ "href": "http://x" })
        );
        assert_eq!(
            serde_json::to_value(Image::new("http://img")).unwrap(),
            json!({ "src": "http://img" })
        );
        assert_eq!(
            serde_json::to_value(Image::new("http://img").with_href("http://x")).unwrap(),
            json!({ "src": "http://img", "href": "http://x" })
        );
    }

    #[test]
    fn test_no_extra_keys_leak_between_variants() {
        let keys = |value: &Value| -> Vec<String> {
            let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
            keys.sort_unstable();
            keys
        };

        let ack = serde_json::to_value(AcknowledgeEvent::new("sv123", "inc123").unwrap()).unwrap();
        assert_eq!(keys(&ack), ["dedup_key", "event_action", "routing_key"]);

        let trig = serde_json::to_value(trigger("Blah").with_dedup_key("inc123")).unwrap();
        assert_eq!(keys(&trig), ["dedup_key", "event_action", "payload", "routing_key"]);
    }
}
