//! # Per-service run bookkeeping.
//!
//! A [`RunRecord`] is created when initialization begins for a service and lives as long as
//! the container. It tracks where the service is in its state machine, the terminal error of
//! its run step, and a one-shot completion signal.
//!
//! ## State machine
//! ```text
//! Registered ──► Initializing ──┬──► InitFailed                      (terminal)
//!                               └──► Initialized ──► Running ──► Stopped (terminal)
//! ```
//!
//! ## Rules
//! - State and error are guarded by one lock; readers always see a consistent pair
//! - The completion signal fires at most once and stays fired (late waiters return at once)
//! - A record is only launched from `Initialized`; anything else is a programming error

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::error::ServiceError;

/// Lifecycle position of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Registered; initialization has not reached this service.
    Registered,
    /// Init step in progress.
    Initializing,
    /// Init step failed; the service never runs.
    InitFailed,
    /// Init done (or not needed); waiting to be launched.
    Initialized,
    /// Run step in progress.
    Running,
    /// Run step returned, with or without error.
    Stopped,
}

impl ServiceState {
    /// Returns true for states a service never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, ServiceState::InitFailed | ServiceState::Stopped)
    }
}

struct Slot {
    state: ServiceState,
    error: Option<ServiceError>,
}

/// Mutable bookkeeping for one service.
pub(crate) struct RunRecord {
    name: Arc<str>,
    slot: Mutex<Slot>,
    done: watch::Sender<bool>,
}

impl RunRecord {
    pub(crate) fn new(name: Arc<str>) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            name,
            slot: Mutex::new(Slot {
                state: ServiceState::Registered,
                error: None,
            }),
            done,
        }
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    // A poisoned lock only means a reader panicked; the slot itself is always valid.
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn state(&self) -> ServiceState {
        self.slot().state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }

    pub(crate) fn error(&self) -> Option<ServiceError> {
        self.slot().error.clone()
    }

    pub(crate) fn set_state(&self, state: ServiceState) {
        self.slot().state = state;
    }

    /// Moves `Initialized → Running`.
    ///
    /// # Panics
    /// If the record was already launched or never initialized.
    pub(crate) fn mark_running(&self) {
        let mut slot = self.slot();
        assert!(
            slot.state == ServiceState::Initialized,
            "service '{}' cannot be launched from state {:?}",
            self.name,
            slot.state
        );
        slot.state = ServiceState::Running;
    }

    /// Stores the run outcome and moves to `Stopped`.
    pub(crate) fn finish(&self, outcome: Result<(), ServiceError>) {
        let mut slot = self.slot();
        slot.state = ServiceState::Stopped;
        slot.error = outcome.err();
    }

    /// Fires the completion signal; later calls are no-ops.
    pub(crate) fn signal_done(&self) {
        self.done.send_if_modified(|done| !std::mem::replace(done, true));
    }

    pub(crate) fn is_done(&self) -> bool {
        *self.done.borrow()
    }

    /// Resolves once the completion signal fired.
    pub(crate) async fn stopped(&self) {
        let mut rx = self.done.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|done| *done).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record() -> Arc<RunRecord> {
        Arc::new(RunRecord::new(Arc::from("svc")))
    }

    #[test]
    fn lifecycle_stores_terminal_error() {
        let rec = record();
        assert_eq!(rec.state(), ServiceState::Registered);

        rec.set_state(ServiceState::Initialized);
        rec.mark_running();
        assert!(rec.is_running());

        rec.finish(Err(ServiceError::fail("boom")));
        assert_eq!(rec.state(), ServiceState::Stopped);
        assert!(rec.state().is_terminal());
        assert_eq!(rec.error().unwrap().to_string(), "execution failed: boom");
    }

    #[test]
    #[should_panic(expected = "cannot be launched")]
    fn launching_twice_panics() {
        let rec = record();
        rec.set_state(ServiceState::Initialized);
        rec.mark_running();
        rec.mark_running();
    }

    #[test]
    #[should_panic(expected = "cannot be launched")]
    fn launching_uninitialized_panics() {
        record().mark_running();
    }

    #[tokio::test]
    async fn completion_signal_reaches_early_and_late_waiters() {
        let rec = record();
        let early = tokio::spawn({
            let rec = rec.clone();
            async move { rec.stopped().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!early.is_finished());

        rec.signal_done();
        rec.signal_done();
        early.await.unwrap();
        assert!(rec.is_done());

        tokio::time::timeout(Duration::from_millis(100), rec.stopped())
            .await
            .expect("late waiter must not block");
    }
}
