//! # Service abstractions.
//!
//! This module provides the service-related types:
//! - [`Service`] - trait for the mandatory, cancelable run step
//! - [`Init`] - trait for the optional one-time init step
//! - [`ServiceFn`] - closure-backed service with an optional init step

mod descriptor;
mod service;
mod service_fn;

pub(crate) use descriptor::{Capability, ServiceDescriptor};
pub use service::{Init, Service};
pub use service_fn::{BoxServiceFuture, ServiceFn};
