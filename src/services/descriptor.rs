//! # Registered service descriptors.
//!
//! A [`ServiceDescriptor`] pairs the logical name computed at registration with the
//! service's capability set. The capability comes from the service itself
//! ([`Service::as_init`]) and is resolved once, when the service is registered.

use std::sync::Arc;

use crate::services::{Init, Service};

/// What a registered service can do.
#[derive(Clone)]
pub(crate) enum Capability {
    /// Only a run step.
    RunOnly(Arc<dyn Service>),
    /// An init step (reached through [`Service::as_init`]) followed by a run step.
    InitAndRun(Arc<dyn Service>),
}

impl Capability {
    /// Classifies `service` by asking it for its init step.
    pub(crate) fn resolve(service: Arc<dyn Service>) -> Self {
        if service.as_init().is_some() {
            Capability::InitAndRun(service)
        } else {
            Capability::RunOnly(service)
        }
    }

    /// The run step; every capability has one.
    pub(crate) fn runner(&self) -> &Arc<dyn Service> {
        match self {
            Capability::RunOnly(run) | Capability::InitAndRun(run) => run,
        }
    }

    /// The init step, if the service has one.
    pub(crate) fn initializer(&self) -> Option<&dyn Init> {
        match self {
            Capability::RunOnly(_) => None,
            Capability::InitAndRun(service) => service.as_init(),
        }
    }
}

/// Immutable registration entry.
#[derive(Clone)]
pub(crate) struct ServiceDescriptor {
    name: Arc<str>,
    capability: Capability,
}

impl ServiceDescriptor {
    /// Builds a descriptor, taking the logical name and capability from the service itself.
    pub(crate) fn new(service: Arc<dyn Service>) -> Self {
        let name = Arc::from(service.name());
        let capability = Capability::resolve(service);
        Self { name, capability }
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn capability(&self) -> &Capability {
        &self.capability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct Anonymous;

    #[async_trait]
    impl Service for Anonymous {
        async fn run(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    struct Named;

    #[async_trait]
    impl Service for Named {
        fn name(&self) -> &str {
            "named"
        }

        async fn run(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
            Ok(())
        }

        fn as_init(&self) -> Option<&dyn Init> {
            Some(self)
        }
    }

    #[async_trait]
    impl Init for Named {
        async fn init(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn name_falls_back_to_type_name() {
        let d = ServiceDescriptor::new(Arc::new(Anonymous));
        assert!(d.name().ends_with("Anonymous"), "got {}", d.name());
        assert!(d.capability().initializer().is_none());
    }

    #[test]
    fn init_capability_is_resolved_at_registration() {
        let d = ServiceDescriptor::new(Arc::new(Named));
        assert_eq!(&**d.name(), "named");
        assert!(matches!(d.capability(), Capability::InitAndRun(_)));
        assert!(d.capability().initializer().is_some());
    }
}
