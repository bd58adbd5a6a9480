//! Error types used by the container and by services.
//!
//! This module defines two main error enums:
//!
//! - [`ContainerError`]: errors raised by the container itself (startup, serving).
//! - [`ServiceError`]: errors returned by a service's init or run step.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the container.
///
/// Only initialization-phase failures are surfaced synchronously from
/// [`Container::start`](crate::Container::start). Run-phase failures are collected
/// and exposed through [`Container::service_errors`](crate::Container::service_errors).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ContainerError {
    /// A service's init step failed; remaining services were neither initialized nor run.
    #[error("failed to init service {service}: {source}")]
    Init {
        /// Logical name of the failing service.
        service: String,
        /// Error returned by the init step.
        source: ServiceError,
    },

    /// Services were still running when the shutdown grace period elapsed.
    #[error("shutdown timeout {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of services that did not stop in time.
        stuck: Vec<String>,
    },

    /// Registering OS signal listeners failed.
    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[from] std::io::Error),
}

impl ContainerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servisor::{ContainerError, ServiceError};
    ///
    /// let err = ContainerError::Init { service: "db".into(), source: ServiceError::fail("refused") };
    /// assert_eq!(err.as_label(), "container_init_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ContainerError::Init { .. } => "container_init_failed",
            ContainerError::GraceExceeded { .. } => "container_grace_exceeded",
            ContainerError::Signal(_) => "container_signal_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ContainerError::Init { service, source } => {
                format!("init of {service} failed: {}", source.as_message())
            }
            ContainerError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck services={stuck:?}")
            }
            ContainerError::Signal(e) => format!("signal registration: {e}"),
        }
    }

    /// Name of the service responsible for the error, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            ContainerError::Init { service, .. } => Some(service),
            _ => None,
        }
    }
}

/// # Errors returned by service steps.
///
/// Any error returned from [`Service::run`](crate::Service::run) triggers a cascading stop
/// of the whole container. The type is cheap to clone so it can be stored per service and
/// handed out in snapshots.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    /// The step failed with a message.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The run step panicked.
    #[error("service panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Any other error produced by the service.
    #[error(transparent)]
    Other(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ServiceError::Fail {
            error: error.into(),
        }
    }

    /// Wraps an arbitrary error.
    ///
    /// # Example
    /// ```
    /// use servisor::ServiceError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port 8080 busy");
    /// let err = ServiceError::other(io);
    /// assert_eq!(err.to_string(), "port 8080 busy");
    /// assert_eq!(err.as_label(), "service_error");
    /// ```
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ServiceError::Other(Arc::new(error))
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Fail { .. } => "service_failed",
            ServiceError::Panicked { .. } => "service_panicked",
            ServiceError::Other(_) => "service_error",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Fail { error } => format!("error: {error}"),
            ServiceError::Panicked { info } => format!("panic: {info}"),
            ServiceError::Other(e) => format!("error: {e}"),
        }
    }
}

/// Renders a panic payload caught by `catch_unwind`.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
