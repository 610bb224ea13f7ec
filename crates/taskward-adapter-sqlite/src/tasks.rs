use crate::rows::{TaskRow, millis};
use crate::storage_error;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use taskward_core::{OrgId, Task, TaskFilter, TaskId};
use taskward_runtime::{RepositoryError, TaskRepository};

const COLUMNS: &str = "id, title, description, status, priority, category, due_date, \
                       owner_user_id, organization_id, sort_order, created_at, updated_at";

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn get(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        sqlx::query_as::<_, TaskRow>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(Task::try_from)
            .transpose()
    }

    async fn list(
        &self,
        organizations: &[OrgId],
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, RepositoryError> {
        if organizations.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM tasks WHERE organization_id IN ("));
        let mut ids = query.separated(", ");
        for id in organizations {
            ids.push_bind(id.get());
        }
        ids.push_unseparated(")");

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        query.push(" ORDER BY sort_order ASC, created_at DESC, id DESC");

        let rows = query
            .build_query_as::<TaskRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        tracing::trace!(organizations = organizations.len(), rows = rows.len(), "Listed task rows");

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn create(&self, mut task: Task) -> Result<Task, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, status, priority, category, due_date, \
             owner_user_id, organization_id, sort_order, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(&task.category)
        .bind(task.due_date.map(millis))
        .bind(task.owner_user_id.get())
        .bind(task.organization_id.get())
        .bind(task.sort_order)
        .bind(millis(task.created_at))
        .bind(millis(task.updated_at))
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        task.id = TaskId(result.last_insert_rowid());
        Ok(task)
    }

    async fn update(&self, task: Task) -> Result<Option<Task>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, \
             category = ?, due_date = ?, sort_order = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(&task.category)
        .bind(task.due_date.map(millis))
        .bind(task.sort_order)
        .bind(millis(task.updated_at))
        .bind(task.id.get())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(task))
    }

    async fn delete(&self, id: TaskId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected() > 0)
    }
}
