//! # Example: basic
//!
//! Three services share one container: a cache that needs a warm-up step, a ticker and a
//! flaky worker that fails after a few ticks. The failure stops the whole container.
//!
//! ## Flow
//! ```text
//! register(cache+init, ticker, flaky) ──► serve()
//!     ├─► init:  cache.init()
//!     ├─► run:   cache, ticker, flaky (one task each)
//!     ├─► flaky returns Err ──► cascade ──► on_shutdown callbacks
//!     └─► grace wait ──► service_errors()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example basic
//! ```

use std::sync::Arc;
use std::time::Duration;

use servisor::{Container, ContainerConfig, LogWriter, ServiceError, ServiceFn, Subscribe};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = ContainerConfig::default()
        .with_name("demo")
        .with_grace(Duration::from_secs(5));
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let container = Container::builder(cfg).with_subscribers(subs).build();

    ServiceFn::new("cache", |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Ok::<_, ServiceError>(())
    })
    .with_init(|_ctx| async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, ServiceError>(())
    })
    .register(&container);

    ServiceFn::new("ticker", |ctx: CancellationToken| async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok::<_, ServiceError>(()),
                _ = interval.tick() => println!("tick"),
            }
        }
    })
    .register(&container);

    ServiceFn::new("flaky", |ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => Ok(()),
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                Err(ServiceError::fail("lost upstream connection"))
            }
        }
    })
    .register(&container);

    container.on_shutdown(|| println!("shutdown callback: releasing resources"));

    container.serve(&CancellationToken::new()).await?;

    for (service, err) in container.service_errors() {
        println!("{service}: {err}");
    }
    Ok(())
}
