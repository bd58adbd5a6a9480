//! # Run phase: one Tokio task per service, cascading stop on failure.
//!
//! ## Flow
//! ```text
//! launch(record, service, token)
//!   ├─► record: Initialized ─► Running        (on the controlling task)
//!   ├─► publish ServiceStarting
//!   └─► tokio::spawn:
//!         ├─► service.run(token)              (panics caught)
//!         ├─► record.finish(outcome)          (Stopped + terminal error)
//!         ├─► Err ─► request_stop("cascade")
//!         └─► record.signal_done()            (drop guard, runs even on unwind)
//! ```
//!
//! ## Rules
//! - The cascade cancels the shared token before the failing service's completion fires
//! - `Ok(())` never cascades; siblings keep running
//! - A panic in `run` counts as a failure (`ServiceError::Panicked`)

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::core::container::Inner;
use crate::core::record::RunRecord;
use crate::error::{panic_message, ServiceError};
use crate::events::EventKind;
use crate::services::Service;

/// Launches the run step of one initialized service; never blocks.
///
/// # Panics
/// If the record is not in the `Initialized` state (double launch).
pub(crate) fn launch(
    inner: Arc<Inner>,
    record: Arc<RunRecord>,
    service: Arc<dyn Service>,
    token: CancellationToken,
) {
    record.mark_running();
    inner.publish(EventKind::ServiceStarting, Some(record.name()));

    tokio::spawn(async move {
        let _done = CompletionGuard(record.clone());
        let outcome = match AssertUnwindSafe(service.run(token)).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(ServiceError::Panicked {
                info: panic_message(&*panic),
            }),
        };

        let failed = match &outcome {
            Ok(()) => {
                inner.publish(EventKind::ServiceStopped, Some(record.name()));
                false
            }
            Err(e) => {
                let reason = e.to_string();
                inner.publish_event(EventKind::ServiceFailed, Some(record.name()), |ev| {
                    ev.with_reason(reason)
                });
                true
            }
        };

        record.finish(outcome);
        if failed {
            inner.request_stop("cascade");
        }
    });
}

/// Fires the record's completion signal when dropped, including while unwinding or when
/// the runtime drops the task.
struct CompletionGuard(Arc<RunRecord>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.signal_done();
    }
}
