//! # Container: registration, two-phase startup, stop requests and queries.
//!
//! The [`Container`] owns the ordered service registry, one [`RunRecord`] per service that
//! reached initialization, the shared run token, and the shutdown notifier.
//!
//! ## Lifecycle
//! ```text
//! register(..) ×N ──► start(parent)
//!                        ├─► token = parent.child_token()
//!                        ├─► init phase   (sequential, registration order)
//!                        │     └─ Err ─► request_stop() ─► return ContainerError::Init
//!                        └─► run phase    (one Tokio task per service, registration order)
//!                              └─ run() -> Err ─► request_stop()   (cascading stop)
//!
//! request_stop()  ──► token.cancel() ──► on_shutdown callbacks (first call only)
//! wait_all_stopped(timeout) ──► startup finished and every completion signal fired,
//!                               or timeout elapsed
//! service_errors()          ──► terminal errors keyed by qualified service name
//! shutdown_subscribers()    ──► deliver pending events, stop subscriber workers
//! ```
//!
//! ## Rules
//! - `start` runs once; a second call panics
//! - descriptors are frozen once `start` begins; late `register` panics
//! - `request_stop` / `wait_all_stopped` before `start` panic
//! - cancellation is cooperative: nothing is aborted, services must watch their token
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use servisor::{Container, ContainerConfig, ServiceError, ServiceFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = Container::new(ContainerConfig::default().with_name("app"));
//!
//!     ServiceFn::new("ticker", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!         Ok::<_, ServiceError>(())
//!     })
//!     .register(&container);
//!
//!     container.start(&CancellationToken::new()).await?;
//!     assert_eq!(container.running_count(), 1);
//!
//!     container.request_stop();
//!     assert!(container.wait_all_stopped(None).await);
//!     assert!(container.service_errors().is_empty());
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::core::{
    builder::{ContainerBuilder, SubscriberListener},
    config::ContainerConfig,
    init,
    notifier::ShutdownNotifier,
    record::{RunRecord, ServiceState},
    registry::Registry,
    runner, shutdown,
};
use crate::error::{ContainerError, ServiceError};
use crate::events::{Bus, Event, EventKind};
use crate::services::{Service, ServiceDescriptor};

/// State shared between the container handle and the service tasks it launched.
pub(crate) struct Inner {
    cfg: ContainerConfig,
    name: Arc<str>,
    bus: Bus,
    registry: RwLock<Registry>,
    records: RwLock<HashMap<Arc<str>, Arc<RunRecord>>>,
    token: OnceLock<CancellationToken>,
    // Set once `start` finished creating records, whether or not init failed.
    startup_done: watch::Sender<bool>,
    notifier: ShutdownNotifier,
    listener: Mutex<Option<SubscriberListener>>,
}

impl Inner {
    pub(crate) fn new(
        cfg: ContainerConfig,
        bus: Bus,
        listener: Option<SubscriberListener>,
    ) -> Self {
        Self {
            name: Arc::from(cfg.name.as_str()),
            cfg,
            bus,
            registry: RwLock::new(Registry::default()),
            records: RwLock::new(HashMap::new()),
            token: OnceLock::new(),
            startup_done: watch::channel(false).0,
            notifier: ShutdownNotifier::default(),
            listener: Mutex::new(listener),
        }
    }

    /// Publishes `kind` tagged with this container's name.
    pub(crate) fn publish(&self, kind: EventKind, service: Option<&Arc<str>>) {
        self.publish_event(kind, service, |ev| ev);
    }

    /// Publishes `kind` after letting `extend` attach extra metadata.
    pub(crate) fn publish_event(
        &self,
        kind: EventKind,
        service: Option<&Arc<str>>,
        extend: impl FnOnce(Event) -> Event,
    ) {
        let mut ev = Event::new(kind).with_container(self.name.clone());
        if let Some(service) = service {
            ev = ev.with_service(service.clone());
        }
        self.bus.publish(extend(ev));
    }

    fn registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }

    fn records(&self) -> RwLockReadGuard<'_, HashMap<Arc<str>, Arc<RunRecord>>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Creates the record for `name`.
    ///
    /// # Panics
    /// If a record for `name` already exists.
    pub(crate) fn create_record(&self, name: &Arc<str>) -> Arc<RunRecord> {
        let record = Arc::new(RunRecord::new(name.clone()));
        let previous = self
            .records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.clone(), record.clone());
        if previous.is_some() {
            panic!(
                "service '{}' already started in container '{}'",
                name, self.name
            );
        }
        record
    }

    fn record(&self, name: &str) -> Option<Arc<RunRecord>> {
        self.records().get(name).cloned()
    }

    fn all_records(&self) -> Vec<Arc<RunRecord>> {
        self.records().values().cloned().collect()
    }

    /// Fires the completion signal of every record; used when startup aborts.
    pub(crate) fn retire_records(&self) {
        for record in self.all_records() {
            record.signal_done();
        }
    }

    fn finish_startup(&self) {
        self.startup_done.send_replace(true);
    }

    /// Resolves once `start` has created and launched every record it is going to.
    async fn startup_finished(&self) {
        let mut rx = self.startup_done.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|done| *done).await;
    }

    fn started_token(&self, op: &str) -> &CancellationToken {
        match self.token.get() {
            Some(token) => token,
            None => panic!("call Container::start() before Container::{op}()"),
        }
    }

    /// Cancels the shared token; the first call also runs the shutdown callbacks.
    pub(crate) fn request_stop(&self, origin: &'static str) {
        self.started_token("request_stop").cancel();
        let Some(panics) = self.notifier.fire() else {
            return;
        };
        self.publish_event(EventKind::ShutdownRequested, None, |ev| {
            ev.with_reason(origin)
        });
        for info in panics {
            self.publish_event(EventKind::CallbackPanicked, None, |ev| ev.with_reason(info));
        }
    }
}

/// Lifecycle container for a set of named services.
///
/// Cheap to clone; clones share the same services, records and token, so a handle can be
/// moved into other tasks (e.g. to call [`request_stop`](Self::request_stop)).
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// Creates an empty container without event subscribers.
    pub fn new(cfg: ContainerConfig) -> Self {
        ContainerBuilder::new(cfg).build()
    }

    /// Returns a builder for attaching event subscribers.
    pub fn builder(cfg: ContainerConfig) -> ContainerBuilder {
        ContainerBuilder::new(cfg)
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Container name (may be empty).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registers a service.
    ///
    /// If the service exposes an init step through [`Service::as_init`], it runs during
    /// [`start`](Self::start) before any run step.
    ///
    /// # Panics
    /// If a service with the same [`Service::name`] is already registered, or the
    /// container has already been started.
    pub fn register<S: Service>(&self, service: Arc<S>) {
        self.register_descriptor(ServiceDescriptor::new(service));
    }

    fn register_descriptor(&self, descriptor: ServiceDescriptor) {
        let name = descriptor.name().clone();
        let inserted = {
            let mut registry = self.inner.registry_mut();
            if self.is_started() {
                None
            } else {
                Some(registry.try_insert(descriptor).is_ok())
            }
        };
        match inserted {
            None => panic!(
                "service '{}' registered after container '{}' was started",
                name, self.inner.name
            ),
            Some(false) => panic!(
                "service '{}' already registered in container '{}'",
                name, self.inner.name
            ),
            Some(true) => {
                self.inner.publish(EventKind::ServiceRegistered, Some(&name));
            }
        }
    }

    /// Initializes every service in registration order, then launches every run step.
    ///
    /// The shared run token is a child of `parent`: cancelling `parent` cancels all services
    /// (without running the shutdown callbacks).
    ///
    /// Only init failures are reported here. Run failures are collected in
    /// [`service_errors`](Self::service_errors).
    ///
    /// # Panics
    /// If called more than once.
    pub async fn start(&self, parent: &CancellationToken) -> Result<(), ContainerError> {
        let token = parent.child_token();
        let descriptors = {
            // Holding the write lock orders this against in-flight registrations.
            let registry = self.inner.registry_mut();
            if self.inner.token.set(token.clone()).is_err() {
                drop(registry);
                panic!("Container::start() can only be called once");
            }
            registry.snapshot()
        };

        if let Err(e) = init::initialize(&self.inner, &descriptors, &token).await {
            self.inner.finish_startup();
            self.inner.request_stop("init_failed");
            return Err(e);
        }

        for descriptor in &descriptors {
            let record = match self.inner.record(descriptor.name()) {
                Some(record) => record,
                None => panic!(
                    "service '{}' not initialized in container '{}'",
                    descriptor.name(),
                    self.inner.name
                ),
            };
            runner::launch(
                self.inner.clone(),
                record,
                descriptor.capability().runner().clone(),
                token.clone(),
            );
        }
        self.inner.finish_startup();
        Ok(())
    }

    /// Starts the container and supervises it until it stops.
    ///
    /// Returns `Ok(())` once every service completed. A stop (cascade, explicit request,
    /// parent cancellation or SIGINT/SIGTERM/SIGQUIT) is followed by a wait bounded by
    /// [`ContainerConfig::grace`]; services still running after it are reported as
    /// [`ContainerError::GraceExceeded`].
    ///
    /// Before returning, pending events are delivered to subscribers
    /// (see [`shutdown_subscribers`](Self::shutdown_subscribers)).
    pub async fn serve(&self, parent: &CancellationToken) -> Result<(), ContainerError> {
        let res = self.supervise(parent).await;
        self.shutdown_subscribers().await;
        res
    }

    async fn supervise(&self, parent: &CancellationToken) -> Result<(), ContainerError> {
        self.start(parent).await?;
        let token = self.inner.started_token("serve").clone();

        tokio::select! {
            res = shutdown::wait_for_shutdown_signal() => {
                self.inner.request_stop("signal");
                res?;
            }
            _ = token.cancelled() => {}
            _ = self.wait_all_stopped(None) => return Ok(()),
        }

        let grace = self.inner.cfg.grace;
        if self.wait_all_stopped(Some(grace)).await {
            Ok(())
        } else {
            Err(ContainerError::GraceExceeded {
                grace,
                stuck: self.running_services(),
            })
        }
    }

    /// Delivers every event published so far to the subscribers, then stops the bus
    /// listener and the subscriber workers.
    ///
    /// Events published afterwards are no longer delivered. Later calls (and containers
    /// built without subscribers) return immediately.
    pub async fn shutdown_subscribers(&self) {
        let listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(listener) = listener {
            listener.shutdown().await;
        }
    }

    /// Requests every service to stop.
    ///
    /// Idempotent: the first call (explicit or cascaded) runs the shutdown callbacks; all
    /// calls leave the token cancelled. Does not wait for services to return.
    ///
    /// # Panics
    /// If the container was not started.
    pub fn request_stop(&self) {
        self.inner.request_stop("explicit");
    }

    /// Waits until every started service completed, or until `timeout` elapses.
    ///
    /// `None` waits without bound. Returns `true` if every service completed. Does not
    /// request a stop; on timeout the services keep running. Called while `start` is still
    /// initializing, it first waits for startup to finish (within the same `timeout`).
    ///
    /// # Panics
    /// If the container was not started.
    pub async fn wait_all_stopped(&self, timeout: Option<Duration>) -> bool {
        self.inner.started_token("wait_all_stopped");
        let all = async {
            self.inner.startup_finished().await;
            let pending: Vec<_> = self
                .inner
                .all_records()
                .into_iter()
                .filter(|r| !r.is_done())
                .collect();
            join_all(pending.iter().map(|r| r.stopped())).await;
        };

        let finished = match timeout {
            None => {
                all.await;
                true
            }
            Some(d) => tokio::time::timeout(d, all).await.is_ok(),
        };

        if finished {
            self.inner.publish(EventKind::AllStopped, None);
        } else if let Some(d) = timeout {
            self.inner
                .publish_event(EventKind::WaitTimedOut, None, |ev| ev.with_timeout(d));
        }
        finished
    }

    /// Adds a callback run once, on the first stop request.
    ///
    /// Callbacks run synchronously on the thread issuing that request, in registration
    /// order. A callback added after the first stop request is dropped without running.
    pub fn on_shutdown<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _accepted = self.inner.notifier.push(Box::new(callback));
    }

    /// Number of services whose run step is in progress.
    pub fn running_count(&self) -> usize {
        self.inner
            .records()
            .values()
            .filter(|r| r.is_running())
            .count()
    }

    /// Names of services whose run step is in progress, sorted.
    pub fn running_services(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .records()
            .values()
            .filter(|r| r.is_running())
            .map(|r| r.name().to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// Registered service names, in registration order.
    pub fn service_names(&self) -> Vec<String> {
        self.inner
            .registry()
            .names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    /// Current state of the named service; `None` if no such service is registered.
    pub fn service_state(&self, name: &str) -> Option<ServiceState> {
        if let Some(record) = self.inner.record(name) {
            return Some(record.state());
        }
        self.inner
            .registry()
            .contains(name)
            .then_some(ServiceState::Registered)
    }

    /// Snapshot of terminal run errors, keyed by qualified service name.
    ///
    /// Keys are `"<container>/<service>"` for named containers and the bare service name
    /// otherwise (`"db"`, never `"/db"`). Services still running or stopped without error
    /// are absent.
    pub fn service_errors(&self) -> HashMap<String, ServiceError> {
        self.inner
            .records()
            .values()
            .filter_map(|r| {
                r.error()
                    .map(|e| (self.inner.cfg.qualified_name(r.name()), e))
            })
            .collect()
    }

    /// Returns true once [`start`](Self::start) has been called.
    pub fn is_started(&self) -> bool {
        self.inner.token.get().is_some()
    }

    /// Shared run token handed to every service, once started.
    pub fn token(&self) -> Option<CancellationToken> {
        self.inner.token.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceFn;

    fn waiting(name: &'static str) -> ServiceFn {
        ServiceFn::new(name, |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok::<_, ServiceError>(())
        })
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_names_panic() {
        let c = Container::new(ContainerConfig::default());
        waiting("db").register(&c);
        waiting("db").register(&c);
    }

    #[test]
    #[should_panic(expected = "before Container::request_stop()")]
    fn stop_before_start_panics() {
        Container::new(ContainerConfig::default()).request_stop();
    }

    #[tokio::test]
    #[should_panic(expected = "before Container::wait_all_stopped()")]
    async fn wait_before_start_panics() {
        Container::new(ContainerConfig::default())
            .wait_all_stopped(None)
            .await;
    }

    #[tokio::test]
    #[should_panic(expected = "can only be called once")]
    async fn second_start_panics() {
        let c = Container::new(ContainerConfig::default());
        c.start(&CancellationToken::new()).await.unwrap();
        let _ = c.start(&CancellationToken::new()).await;
    }

    #[tokio::test]
    #[should_panic(expected = "registered after container")]
    async fn register_after_start_panics() {
        let c = Container::new(ContainerConfig::default());
        c.start(&CancellationToken::new()).await.unwrap();
        waiting("late").register(&c);
    }

    #[tokio::test]
    async fn states_follow_the_lifecycle() {
        let c = Container::new(ContainerConfig::default().with_name("unit"));
        waiting("a").register(&c);
        assert_eq!(c.name(), "unit");
        assert_eq!(c.service_state("a"), Some(ServiceState::Registered));
        assert_eq!(c.service_state("missing"), None);
        assert!(!c.is_started());

        c.start(&CancellationToken::new()).await.unwrap();
        assert!(c.is_started());
        assert_eq!(c.service_state("a"), Some(ServiceState::Running));
        assert_eq!(c.running_services(), vec!["a".to_string()]);

        c.request_stop();
        assert!(c.token().unwrap().is_cancelled());
        assert!(c.wait_all_stopped(None).await);
        assert_eq!(c.service_state("a"), Some(ServiceState::Stopped));
        assert_eq!(c.running_count(), 0);
    }

    #[tokio::test]
    async fn empty_container_stops_immediately() {
        let c = Container::new(ContainerConfig::default());
        c.start(&CancellationToken::new()).await.unwrap();
        assert!(c.wait_all_stopped(Some(Duration::from_millis(10))).await);
        assert!(c.service_names().is_empty());
    }
}
