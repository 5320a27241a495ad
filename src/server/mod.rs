//! Read-only HTTP API over the prompt directory.
mod error;
mod handlers;
mod router;
mod state;

use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::info;

pub use router::build_router;
pub use state::AppState;

use crate::prompts::PromptSource;

/// Bind `addr` and serve until Ctrl-C
pub async fn serve<S: PromptSource + 'static>(
    addr: impl ToSocketAddrs,
    state: AppState<S>,
) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
