//! # Service contracts.
//!
//! A service is a named unit of background work. Every service implements [`Service`]
//! (the mandatory run step); services that need one-time startup work additionally
//! implement [`Init`] and expose it through [`Service::as_init`].
//!
//! Both steps receive the container's shared [`CancellationToken`]. Cancellation is
//! cooperative: the container never aborts a running step, so implementations must watch
//! the token and return once it fires.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;

/// # Long-running background work.
///
/// `run` is launched on its own Tokio task once every registered service initialized.
/// It should keep running until `ctx` is cancelled and then shut down gracefully.
///
/// - Returning `Ok(())` means the service finished its work; siblings are unaffected.
/// - Returning `Err(_)` stops the whole container (cascading stop).
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use servisor::{Service, ServiceError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Service for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
///         loop {
///             tokio::select! {
///                 _ = ctx.cancelled() => return Ok(()),
///                 _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns the logical service name; must be unique within one container.
    ///
    /// The default uses `type_name::<Self>()`, override it when more than one instance
    /// of a type is registered.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs the service until completion or cancellation.
    async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError>;

    /// Exposes the service's init step, if it has one.
    ///
    /// Types implementing [`Init`] return `Some(self)`; the container reads this once at
    /// registration and runs the init step before any run step starts.
    fn as_init(&self) -> Option<&dyn Init> {
        None
    }
}

/// # Optional one-time initialization.
///
/// Init steps run sequentially in registration order before any run step starts.
/// The first failing init aborts startup: later services are never initialized and no
/// service runs.
///
/// A service opts in by overriding [`Service::as_init`]:
///
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use servisor::{Init, Service, ServiceError};
///
/// struct Cache;
///
/// #[async_trait]
/// impl Service for Cache {
///     async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
///
///     fn as_init(&self) -> Option<&dyn Init> {
///         Some(self)
///     }
/// }
///
/// #[async_trait]
/// impl Init for Cache {
///     async fn init(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Init: Send + Sync + 'static {
    /// Prepares the service; called exactly once, before [`Service::run`].
    async fn init(&self, ctx: CancellationToken) -> Result<(), ServiceError>;
}
