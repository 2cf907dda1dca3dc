pub mod render;
pub mod routes;

pub use routes::{router, status_for, ApiError};

use crate::core::ReviewEngine;
use crate::domain::ports::{LlmClient, Storage, TextExtractor};
use crate::utils::error::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Serves the dashboard and JSON API until interrupted.
pub async fn start_server<E, L, S>(
    addr: SocketAddr,
    engine: Arc<ReviewEngine<E, L, S>>,
    max_upload_bytes: usize,
) -> Result<()>
where
    E: TextExtractor + 'static,
    L: LlmClient + 'static,
    S: Storage + 'static,
{
    let app = router(engine, max_upload_bytes);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
