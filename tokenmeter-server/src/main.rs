//! tokenmeter-server - web page and HTTP API for counting tokens

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokenmeter_server::{ServerArgs, TokenmeterRouter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tokenmeter-server v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(args.registry());
    let app = TokenmeterRouter::from_arc(registry)
        .debug(args.debug)
        .build();

    let listener = args
        .bind()
        .await
        .with_context(|| format!("failed to bind {}:{}", args.host, args.port))?;
    let addr = listener.local_addr()?;
    info!("Listening on http://{}", addr);
    info!("Local access: http://localhost:{}", addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
