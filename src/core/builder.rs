use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::container::{Container, Inner};
use crate::events::Event;
use crate::{
    core::ContainerConfig,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Container`] with optional event subscribers.
pub struct ContainerBuilder {
    cfg: ContainerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ContainerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ContainerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (registration, init, run outcome, shutdown)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the container.
    ///
    /// With subscribers attached this spawns the bus listener and the subscriber workers,
    /// so it must be called inside a Tokio runtime. Without subscribers it spawns nothing.
    pub fn build(self) -> Container {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            // Subscribe before any event can be published.
            let rx = bus.subscribe();
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            Some(SubscriberListener::spawn(rx, set))
        };

        Container::from_inner(Arc::new(Inner::new(self.cfg, bus, listener)))
    }
}

/// Bus listener feeding a [`SubscriberSet`], stoppable with a final drain.
pub(crate) struct SubscriberListener {
    stop: CancellationToken,
    handle: JoinHandle<SubscriberSet>,
}

impl SubscriberListener {
    fn spawn(mut rx: broadcast::Receiver<Event>, set: SubscriberSet) -> Self {
        let stop = CancellationToken::new();
        let stopped = stop.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => return set,
                    },
                    _ = stopped.cancelled() => break,
                }
            }
            // Forward whatever was published before the stop.
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(&ev),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            set
        });
        Self { stop, handle }
    }

    /// Stops the listener after forwarding pending events, then drains every subscriber
    /// queue and waits for the workers.
    pub(crate) async fn shutdown(self) {
        self.stop.cancel();
        if let Ok(set) = self.handle.await {
            set.shutdown().await;
        }
    }
}
