//! # LogWriter: lifecycle events as `tracing` records
//!
//! A subscriber that renders incoming [`Event`]s through the `tracing` facade, with the
//! container and service attached as structured fields. Install any `tracing` subscriber
//! (e.g. `tracing_subscriber::fmt`) to see the output.
//!
//! ## Example output
//! ```text
//! INFO  servisor: registered service container="edge" service="http"
//! INFO  servisor: initializing service container="edge" service="http"
//! INFO  servisor: starting service container="edge" service="http"
//! ERROR servisor: service stopped with error container="edge" service="db" error="connection reset"
//! INFO  servisor: shutdown requested container="edge" reason="cascade"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let container = e.container.as_deref().unwrap_or("");
        let service = e.service.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::ServiceRegistered => {
                info!(container, service, "registered service");
            }
            EventKind::InitStarting => {
                info!(container, service, "initializing service");
            }
            EventKind::InitSucceeded => {
                info!(container, service, "initialized service");
            }
            EventKind::InitFailed => {
                error!(container, service, error = reason, "failed to initialize service");
            }
            EventKind::ServiceStarting => {
                info!(container, service, "starting service");
            }
            EventKind::ServiceStopped => {
                info!(container, service, "service stopped");
            }
            EventKind::ServiceFailed => {
                error!(container, service, error = reason, "service stopped with error");
            }
            EventKind::ShutdownRequested => {
                info!(container, reason, "shutdown requested");
            }
            EventKind::CallbackPanicked => {
                error!(container, info = reason, "shutdown callback panicked");
            }
            EventKind::AllStopped => {
                debug!(container, "all services stopped");
            }
            EventKind::WaitTimedOut => {
                warn!(container, timeout_ms = ?e.timeout_ms, "services still running after wait");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = service, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = service, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
