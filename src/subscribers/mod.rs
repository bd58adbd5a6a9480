//! # Event subscribers for container observability.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out used by the
//! container, and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Container / service tasks ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                         │
//!                                                               ┌─────────┼─────────┐
//!                                                               ▼         ▼         ▼
//!                                                           LogWriter  Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
