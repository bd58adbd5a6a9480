//! # Init phase: sequential, registration-ordered, abort on first failure.
//!
//! ## Flow
//! ```text
//! for descriptor in registry (registration order):
//!   ├─► create RunRecord              (Registered)
//!   ├─► RunOnly     ─► Initialized
//!   └─► InitAndRun  ─► Initializing ─► init(token)
//!                        ├─ Ok  ─► Initialized
//!                        └─ Err ─► InitFailed, retire records, return ContainerError::Init
//! ```
//!
//! ## Rules
//! - Services after the failing one get no record and are never initialized
//! - Services before it stay `Initialized` and never run
//! - Every record created so far gets its completion signal on failure, so waiters return

use tokio_util::sync::CancellationToken;

use crate::core::container::Inner;
use crate::core::record::ServiceState;
use crate::error::ContainerError;
use crate::events::EventKind;
use crate::services::ServiceDescriptor;

/// Runs the init step of each descriptor in order.
pub(crate) async fn initialize(
    inner: &Inner,
    descriptors: &[ServiceDescriptor],
    token: &CancellationToken,
) -> Result<(), ContainerError> {
    for descriptor in descriptors {
        let name = descriptor.name();
        let record = inner.create_record(name);

        let Some(init) = descriptor.capability().initializer() else {
            record.set_state(ServiceState::Initialized);
            continue;
        };

        record.set_state(ServiceState::Initializing);
        inner.publish(EventKind::InitStarting, Some(name));

        match init.init(token.clone()).await {
            Ok(()) => {
                record.set_state(ServiceState::Initialized);
                inner.publish(EventKind::InitSucceeded, Some(name));
            }
            Err(source) => {
                record.set_state(ServiceState::InitFailed);
                let reason = source.to_string();
                inner.publish_event(EventKind::InitFailed, Some(name), |ev| {
                    ev.with_reason(reason)
                });
                inner.retire_records();
                return Err(ContainerError::Init {
                    service: name.to_string(),
                    source,
                });
            }
        }
    }
    Ok(())
}
