//! SQLite implementations of the Taskward repository traits.
//!
//! [`SqliteStore`] owns the connection pool and runs the embedded
//! migrations; the repositories it hands out share that pool.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use taskward_core::DatabaseConfig;
use taskward_runtime::RepositoryError;

mod organizations;
mod rows;
mod tasks;
mod users;

pub use organizations::SqliteOrganizationRepository;
pub use tasks::SqliteTaskRepository;
pub use users::SqliteUserRepository;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect using the database section of the configuration.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        Self::connect_url(&config.resolve_url(), config.max_connections).await
    }

    pub async fn connect_url(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        ensure_parent_dir(url)?;

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        tracing::info!(url = %url, "Connected to SQLite");
        Ok(Self { pool })
    }

    /// A private in-memory database.
    ///
    /// Every connection to `sqlite::memory:` opens a fresh database, so the
    /// pool is pinned to a single connection that never expires.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn organizations(&self) -> SqliteOrganizationRepository {
        SqliteOrganizationRepository::new(self.pool.clone())
    }

    pub fn tasks(&self) -> SqliteTaskRepository {
        SqliteTaskRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// SQLite creates the database file but not its directory.
fn ensure_parent_dir(url: &str) -> std::io::Result<()> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Map a driver error onto the repository error space.
pub(crate) fn storage_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err
        && (db.is_unique_violation() || db.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(db.message().to_string());
    }
    RepositoryError::Backend(err.to_string())
}
