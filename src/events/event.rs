//! # Lifecycle events emitted by the container and its services.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registration**: a service descriptor was accepted
//! - **Init phase**: sequential initialization progress and failure
//! - **Run phase**: service run steps starting, stopping, failing
//! - **Shutdown / waiting**: stop requests and completion of the bounded wait
//!
//! The [`Event`] struct carries metadata such as timestamp, container and service names,
//! reasons and wait timeouts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use servisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServiceFailed)
//!     .with_container("api")
//!     .with_service("http")
//!     .with_reason("bind: address in use");
//!
//! assert_eq!(ev.kind, EventKind::ServiceFailed);
//! assert_eq!(ev.service.as_deref(), Some("http"));
//! assert_eq!(ev.reason.as_deref(), Some("bind: address in use"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Registration ===
    /// A service was registered.
    ///
    /// Sets:
    /// - `service`: logical service name
    ServiceRegistered,

    // === Init phase ===
    /// The init step of a service is about to run.
    InitStarting,

    /// The init step of a service returned successfully.
    InitSucceeded,

    /// The init step of a service failed; startup is aborted.
    ///
    /// Sets:
    /// - `reason`: failure message
    InitFailed,

    // === Run phase ===
    /// The run step of a service was launched.
    ServiceStarting,

    /// The run step returned without error.
    ServiceStopped,

    /// The run step returned an error (or panicked); a cascading stop follows.
    ///
    /// Sets:
    /// - `reason`: failure message
    ServiceFailed,

    // === Shutdown / waiting ===
    /// First stop request for the container (explicit, cascaded or OS signal).
    ///
    /// Sets:
    /// - `reason`: origin of the request
    ShutdownRequested,

    /// A shutdown callback panicked; the remaining callbacks still ran.
    ///
    /// Sets:
    /// - `reason`: panic info/message
    CallbackPanicked,

    /// A bounded wait observed every service complete.
    AllStopped,

    /// A bounded wait elapsed while services were still running.
    ///
    /// Sets:
    /// - `timeout_ms`: the wait timeout (ms)
    WaitTimedOut,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the emitting container, if it has one.
    pub container: Option<Arc<str>>,
    /// Name of the service, if applicable.
    pub service: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Wait timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            container: None,
            service: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches the container name; empty names are skipped.
    #[inline]
    pub fn with_container(mut self, container: impl Into<Arc<str>>) -> Self {
        let container = container.into();
        if !container.is_empty() {
            self.container = Some(container);
        }
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
