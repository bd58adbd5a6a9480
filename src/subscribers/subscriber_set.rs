//! # Container event fan-out.
//!
//! [`SubscriberSet`] hands every lifecycle event a container publishes (registration, init,
//! run outcome, stop requests, waits) to each attached [`Subscribe`] implementation. The
//! container's bus listener is the only caller of [`emit`](SubscriberSet::emit); service
//! tasks and stop requests never wait on a subscriber.
//!
//! ## Architecture
//! ```text
//! bus listener ── emit(event)
//!                    │
//!                    ├──► [queue: LogWriter] ──► worker ──► on_event()
//!                    │                               └────► panic ─► SubscriberPanicked
//!                    └──► [queue: metrics]   ──► worker ──► on_event()
//!                                             full ─► SubscriberOverflow
//!
//! Container::shutdown_subscribers ──► shutdown(): close queues, await workers
//! ```
//!
//! ## Rules
//! - Each subscriber sees events in publication order; no ordering across subscribers
//! - A full queue drops the event for that subscriber only and reports `SubscriberOverflow`
//! - `emit()` never blocks a service task (`try_send`)
//! - `shutdown()` lets every worker finish its queued events before returning
//!
//! A subscriber that panics while holding a lock on shared state may leave that state
//! inconsistent; its worker keeps running.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_message;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Per-subscriber queues and workers behind one container's event stream.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called inside a Tokio runtime when `subs` is non-empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    {
                        let info = panic_message(&*panic_err);
                        bus_for_worker.publish(Event::subscriber_panicked(sub.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits an event to all subscribers (clones the event once).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// Overflow events are not re-published if they themselves overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = event.is_subscriber_overflow();

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    /// Closes every subscriber queue and waits until each worker delivered what was queued.
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}
