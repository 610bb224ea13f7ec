//! Storage seams consumed by [`crate::TaskService`].
//!
//! Implementations must be safe to share across request tasks.

use crate::error::RepositoryError;
use async_trait::async_trait;
use taskward_core::{OrgId, Organization, Task, TaskFilter, TaskId, User, UserId};

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// The full organization snapshot.
    async fn all(&self) -> Result<Vec<Organization>, RepositoryError>;

    async fn get(&self, id: OrgId) -> Result<Option<Organization>, RepositoryError>;

    /// Insert with the caller-chosen id. Fails on a duplicate id.
    async fn create(&self, organization: Organization) -> Result<Organization, RepositoryError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;

    /// Tasks whose organization is in `organizations` and that match
    /// `filter`, ordered by `sort_order` ascending then `created_at`
    /// descending.
    async fn list(
        &self,
        organizations: &[OrgId],
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, RepositoryError>;

    /// Insert a new task. `task.id` is ignored; the stored id is returned.
    async fn create(&self, task: Task) -> Result<Task, RepositoryError>;

    /// Replace a stored task. Returns `None` when it no longer exists.
    async fn update(&self, task: Task) -> Result<Option<Task>, RepositoryError>;

    /// Returns whether a task was removed.
    async fn delete(&self, id: TaskId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user. `user.id` is ignored; the stored id is returned.
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
}
