//! # servisor
//!
//! **Servisor** is a lifecycle container for long-running async services.
//!
//! Applications register a set of named services, start them together, stop them
//! together, and inspect how each one ended. A service that fails while running brings
//! the whole group down (cascading stop), so a process never keeps serving with half of
//! its components gone.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Service    │   │ Service+Init │   │  ServiceFn   │
//!     │    ("db")    │   │   ("http")   │   │  ("ticker")  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Container                                                        │
//! │  - Registry (ordered, name-unique)                                │
//! │  - RunRecords (state, terminal error, completion signal)          │
//! │  - shared CancellationToken (child of the caller's token)         │
//! │  - ShutdownNotifier (exactly-once callbacks)                      │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  run task    │   │  run task    │   │  run task    │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ ServiceStarting  │ ServiceStopped   │ ServiceFailed   │ InitFailed
//!      │                  │                  │ ─► cascade      │ ShutdownRequested
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: ContainerConfig::bus_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                           SubscriberSet (per-sub queues)
//!                        ┌─────────┼─────────┐
//!                        ▼         ▼         ▼
//!                    LogWriter  metrics   custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! register(..) ──► start(parent)
//!                    ├─► init phase: for each service, in registration order
//!                    │     └─ Err ─► stop, retire records, return ContainerError::Init
//!                    └─► run phase: spawn every run step, return Ok(())
//!                          └─ run() -> Err ─► request_stop() (cascade)
//!
//! request_stop() ──► cancel token ──► on_shutdown callbacks (once)
//! wait_all_stopped(timeout) ──► true when every service completed
//! service_errors() ──► { "<container>/<service>": ServiceError }
//! shutdown_subscribers() ──► deliver pending events, join subscriber workers
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Container**     | Register, start, stop and inspect a group of services.        | [`Container`], [`ServiceState`]           |
//! | **Services**      | Define services as trait impls or closures.                   | [`Service`], [`Init`], [`ServiceFn`]      |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).        | [`Subscribe`], [`Event`], [`EventKind`]   |
//! | **Errors**        | Typed errors for the container and for services.              | [`ContainerError`], [`ServiceError`]      |
//! | **Configuration** | Container name, grace period, bus capacity.                   | [`ContainerConfig`], [`ContainerBuilder`] |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber, backed by `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use servisor::{Container, ContainerConfig, ServiceError, ServiceFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn servisor::Subscribe>> = vec![Arc::new(servisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn servisor::Subscribe>> = Vec::new();
//!
//!     let container = Container::builder(ContainerConfig::default().with_name("app"))
//!         .with_subscribers(subs)
//!         .build();
//!
//!     ServiceFn::new("worker", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!         Ok::<_, ServiceError>(())
//!     })
//!     .with_init(|_ctx| async { Ok::<_, ServiceError>(()) })
//!     .register(&container);
//!
//!     container.on_shutdown(|| println!("shutting down"));
//!     container.start(&CancellationToken::new()).await?;
//!
//!     container.request_stop();
//!     assert!(container.wait_all_stopped(Some(Duration::from_secs(5))).await);
//!     assert!(container.service_errors().is_empty());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Container, ContainerBuilder, ContainerConfig, ServiceState};
pub use error::{ContainerError, ServiceError};
pub use events::{Bus, Event, EventKind};
pub use services::{BoxServiceFuture, Init, Service, ServiceFn};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose the built-in `tracing` subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
