//! # Shutdown notifier - exactly-once stop callbacks.
//!
//! Holds application callbacks registered via
//! [`Container::on_shutdown`](crate::Container::on_shutdown) and runs them on the first stop
//! request, whether explicit or cascaded from a failing service.
//!
//! ## Rules
//! - `fire()` returns `Some` only for the first caller; callbacks run on that caller, in
//!   registration order
//! - Callbacks run outside the lock, so a callback may itself request a stop
//! - A panicking callback is caught; the remaining callbacks still run
//! - Callbacks added after the notifier fired are dropped and never invoked

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::panic_message;

type ShutdownCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
pub(crate) struct ShutdownNotifier {
    fired: AtomicBool,
    callbacks: Mutex<Vec<ShutdownCallback>>,
}

impl ShutdownNotifier {
    /// Queues `callback`; returns `false` if the notifier already fired.
    pub(crate) fn push(&self, callback: ShutdownCallback) -> bool {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
        // Checked under the lock: `fire` swaps the flag before draining the list.
        if self.fired.load(Ordering::Acquire) {
            return false;
        }
        callbacks.push(callback);
        true
    }

    /// Runs every queued callback once; only the first call does anything.
    ///
    /// Returns `None` if the notifier already fired, otherwise the messages of the
    /// callbacks that panicked.
    pub(crate) fn fire(&self) -> Option<Vec<String>> {
        let drained = {
            let mut callbacks = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
            if self.fired.swap(true, Ordering::AcqRel) {
                return None;
            }
            std::mem::take(&mut *callbacks)
        };
        let mut panics = Vec::new();
        for callback in drained {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(callback)) {
                panics.push(panic_message(&*panic));
            }
        }
        Some(panics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn callbacks_run_once_in_order() {
        let notifier = ShutdownNotifier::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            assert!(notifier.push(Box::new(move || log.lock().unwrap().push(i))));
        }

        assert_eq!(notifier.fire(), Some(Vec::new()));
        assert_eq!(notifier.fire(), None);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn late_callbacks_are_rejected() {
        let notifier = ShutdownNotifier::default();
        notifier.fire();
        assert!(!notifier.push(Box::new(|| panic!("must not run"))));
        assert_eq!(notifier.fire(), None);
    }

    #[test]
    fn callback_may_reenter_fire() {
        let notifier = Arc::new(ShutdownNotifier::default());
        let inner = notifier.clone();
        notifier.push(Box::new(move || {
            assert_eq!(inner.fire(), None);
            assert!(!inner.push(Box::new(|| {})));
        }));
        assert_eq!(notifier.fire(), Some(Vec::new()));
    }

    #[test]
    fn panicking_callback_does_not_skip_the_rest() {
        let notifier = ShutdownNotifier::default();
        let ran = Arc::new(Mutex::new(Vec::new()));

        let first = ran.clone();
        notifier.push(Box::new(move || first.lock().unwrap().push("first")));
        notifier.push(Box::new(|| panic!("flush failed")));
        let last = ran.clone();
        notifier.push(Box::new(move || last.lock().unwrap().push("last")));

        assert_eq!(notifier.fire(), Some(vec!["flush failed".to_string()]));
        assert_eq!(*ran.lock().unwrap(), vec!["first", "last"]);
    }
}
