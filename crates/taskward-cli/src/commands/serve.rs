//! `taskward serve` - Run the REST server.

use taskward_core::TaskwardConfig;

pub async fn run(config: TaskwardConfig) -> anyhow::Result<()> {
    tracing::info!(
        backend = ?config.database.backend,
        audit = config.audit.enabled,
        "Starting taskward"
    );
    taskward_server::serve(&config).await
}
