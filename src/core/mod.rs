//! Container core: registration, startup and shutdown.
//!
//! The public API from this module is [`Container`] (with [`ContainerBuilder`] and
//! [`ContainerConfig`]) plus the [`ServiceState`] it reports.
//!
//! Internal modules:
//! - [`container`]: registry, queries, stop requests and bounded waits;
//! - [`init`]: sequential init phase;
//! - [`runner`]: one run task per service, cascading stop on failure;
//! - [`record`]: per-service state, terminal error and completion signal;
//! - [`notifier`]: exactly-once shutdown callbacks;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod container;
mod init;
mod notifier;
mod record;
mod registry;
mod runner;
mod shutdown;

pub use builder::ContainerBuilder;
pub use config::ContainerConfig;
pub use container::Container;
pub use record::ServiceState;
