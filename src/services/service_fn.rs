//! # Function-backed service (`ServiceFn`)
//!
//! [`ServiceFn`] builds a service from closures `Fn(CancellationToken) -> Fut`, producing a
//! fresh future per call. Shared state, if any, has to be captured explicitly (`Arc<...>`).
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use servisor::{Container, ContainerConfig, ServiceError, ServiceFn};
//!
//! let container = Container::new(ContainerConfig::default());
//!
//! ServiceFn::new("worker", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, ServiceError>(())
//! })
//! .with_init(|_ctx: CancellationToken| async { Ok::<_, ServiceError>(()) })
//! .register(&container);
//!
//! assert_eq!(container.service_names(), vec!["worker".to_string()]);
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::Container;
use crate::error::ServiceError;
use crate::services::{Init, Service};

/// Boxed future returned by a service step.
pub type BoxServiceFuture = Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send>>;

type StepFn = Arc<dyn Fn(CancellationToken) -> BoxServiceFuture + Send + Sync>;

fn boxed_step<F, Fut>(f: F) -> StepFn
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    Arc::new(move |ctx| -> BoxServiceFuture { Box::pin(f(ctx)) })
}

/// Function-backed service implementation.
pub struct ServiceFn {
    name: Cow<'static, str>,
    init: Option<StepFn>,
    run: StepFn,
}

impl ServiceFn {
    /// Creates a run-only service from a name and a run closure.
    pub fn new<F, Fut>(name: impl Into<Cow<'static, str>>, run: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            init: None,
            run: boxed_step(run),
        }
    }

    /// Adds an init step.
    pub fn with_init<F, Fut>(mut self, init: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        self.init = Some(boxed_step(init));
        self
    }

    /// Returns true if an init step was supplied.
    pub fn has_init(&self) -> bool {
        self.init.is_some()
    }

    /// Registers the service, with its init step when one was supplied.
    ///
    /// # Panics
    /// Same as [`Container::register`].
    pub fn register(self, container: &Container) {
        container.register(Arc::new(self));
    }
}

#[async_trait]
impl Service for ServiceFn {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        (self.run)(ctx).await
    }

    fn as_init(&self) -> Option<&dyn Init> {
        if self.has_init() {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl Init for ServiceFn {
    async fn init(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        match &self.init {
            Some(init) => init(ctx).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn steps_create_fresh_futures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let svc = ServiceFn::new("counter", move |_ctx| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ServiceError>(())
            }
        });

        assert_eq!(Service::name(&svc), "counter");
        assert!(!svc.has_init());
        assert!(svc.as_init().is_none());
        svc.run(CancellationToken::new()).await.unwrap();
        svc.run(CancellationToken::new()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_init_is_a_no_op() {
        let svc = ServiceFn::new("noop", |_ctx| async { Ok::<_, ServiceError>(()) });
        assert!(svc.init(CancellationToken::new()).await.is_ok());

        let failing = ServiceFn::new("bad", |_ctx| async { Ok::<_, ServiceError>(()) })
            .with_init(|_ctx| async { Err::<(), _>(ServiceError::fail("nope")) });
        assert!(failing.has_init());
        assert!(failing.as_init().is_some());
        let err = failing.init(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "execution failed: nope");
    }
}
