//! Taskward REST API.
//!
//! Every route except `/healthz`, `/auth/login` and `/auth/register` runs behind
//! [`middleware::auth::require_principal`], which turns the bearer token
//! into a [`taskward_core::Principal`]. Authorization itself happens in
//! [`taskward_runtime::TaskService`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::bootstrap::{Repositories, build_state, seed_if_empty};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

use taskward_core::TaskwardConfig;

/// Build the application from `config` and serve until Ctrl-C.
pub async fn serve(config: &TaskwardConfig) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    let app = router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("taskward listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("taskward stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
