//! API server implementation

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::{AppState, Result, build_router};

/// Bind `addr` and serve the API until the process exits.
///
/// # Errors
///
/// `Io` if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        "Serving {} records on http://{}",
        state.index.record_count(),
        listener.local_addr()?
    );

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
