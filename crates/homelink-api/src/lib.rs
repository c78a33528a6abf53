//! HTTP facade for HomeLink.
//!
//! Thin shell over the core: status snapshots, manual relay control, the
//! chat endpoint (translate, then dispatch when an action is needed), and
//! short in-memory histories of telemetry and chat exchanges.

pub mod history;
pub mod routes;
pub mod state;
pub mod types;

pub use history::{ChatRecord, History, SensorRecord};
pub use routes::create_router;
pub use state::ServerState;

use std::net::SocketAddr;

use tracing::info;

/// Bind and serve the facade until the process exits.
pub async fn run(
    bind: SocketAddr,
    state: ServerState,
    allowed_origins: &[String],
) -> std::io::Result<()> {
    let app = create_router(state, allowed_origins);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(%bind, "http facade listening");
    axum::serve(listener, app).await
}
