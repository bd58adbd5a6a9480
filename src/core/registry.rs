//! # Service registry - ordered, name-unique descriptor list.
//!
//! ## Rules
//! - Descriptors keep registration order; init and launch follow it
//! - No two descriptors share a logical name
//! - The container freezes the registry when startup begins

use std::sync::Arc;

use crate::services::ServiceDescriptor;

/// Ordered collection of registered services.
#[derive(Default)]
pub(crate) struct Registry {
    descriptors: Vec<ServiceDescriptor>,
}

impl Registry {
    /// Appends `descriptor`, or hands it back if its name is already taken.
    pub(crate) fn try_insert(
        &mut self,
        descriptor: ServiceDescriptor,
    ) -> Result<(), ServiceDescriptor> {
        if self.contains(descriptor.name()) {
            return Err(descriptor);
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| &**d.name() == name)
    }

    /// Names in registration order.
    pub(crate) fn names(&self) -> Vec<Arc<str>> {
        self.descriptors.iter().map(|d| d.name().clone()).collect()
    }

    /// Cheap copy of the descriptors (each holds `Arc`s), in registration order.
    pub(crate) fn snapshot(&self) -> Vec<ServiceDescriptor> {
        self.descriptors.clone()
    }
}
