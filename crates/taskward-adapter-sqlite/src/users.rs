use crate::rows::{UserRow, millis};
use crate::storage_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use taskward_core::{User, UserId};
use taskward_runtime::{RepositoryError, UserRepository};

const COLUMNS: &str = "id, email, first_name, last_name, password_hash, organization_id, role, \
                       created_at, updated_at";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        // The email column is declared COLLATE NOCASE.
        sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, mut user: User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (email, first_name, last_name, password_hash, organization_id, \
             role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.organization_id.get())
        .bind(user.role.as_str())
        .bind(millis(user.created_at))
        .bind(millis(user.updated_at))
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        user.id = UserId(result.last_insert_rowid());
        Ok(user)
    }
}
