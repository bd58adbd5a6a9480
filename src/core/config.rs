//! # Container configuration.
//!
//! Provides [`ContainerConfig`] centralized settings for one service container.
//!
//! ## Sentinel values
//! - `name = ""` → unnamed container; error keys are plain service names
//! - `bus_capacity = 0` → clamped to 1 by the event bus

use std::time::Duration;

/// Configuration for a [`Container`](crate::Container).
///
/// ## Field semantics
/// - `name`: Identifies the container in events and qualifies keys of
///   [`service_errors`](crate::Container::service_errors)
/// - `grace`: Maximum wait for services to stop in [`serve`](crate::Container::serve)
/// - `bus_capacity`: Event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct ContainerConfig {
    /// Optional container name (empty = unnamed).
    pub name: String,

    /// Maximum time `serve` waits for services after a stop before giving up.
    ///
    /// When the grace period elapses, `serve` returns
    /// [`ContainerError::GraceExceeded`](crate::ContainerError::GraceExceeded); the services
    /// keep running in the background.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` messages skip older items.
    pub bus_capacity: usize,
}

impl ContainerConfig {
    /// Returns the config with `name` set.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the config with `grace` set.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Key under which a service's error is reported: `"<container>/<service>"`,
    /// or just the service name for an unnamed container.
    pub fn qualified_name(&self, service: &str) -> String {
        if self.name.is_empty() {
            service.to_string()
        } else {
            format!("{}/{}", self.name, service)
        }
    }
}

impl Default for ContainerConfig {
    /// Default configuration:
    ///
    /// - `name = ""` (unnamed)
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            name: String::new(),
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_depends_on_container_name() {
        let cfg = ContainerConfig::default();
        assert_eq!(cfg.qualified_name("db"), "db");

        let cfg = cfg.with_name("edge");
        assert_eq!(cfg.qualified_name("db"), "edge/db");
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = ContainerConfig {
            bus_capacity: 0,
            ..ContainerConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(ContainerConfig::default().bus_capacity_clamped(), 1024);
    }
}
