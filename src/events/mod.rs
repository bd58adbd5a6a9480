//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted while a container registers, initializes,
//! runs and stops its services.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Container` (registration, init, stop requests, waits),
//!   service run tasks, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by `ContainerBuilder::build`,
//!   which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
