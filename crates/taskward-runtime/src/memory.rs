//! In-memory repositories for tests and the `memory` database backend.

use crate::error::RepositoryError;
use crate::repository::{OrganizationRepository, TaskRepository, UserRepository};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use taskward_core::{OrgId, Organization, Task, TaskFilter, TaskId, User, UserId};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryOrganizationRepository {
    organizations: RwLock<BTreeMap<OrgId, Organization>>,
}

impl MemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organizations(organizations: impl IntoIterator<Item = Organization>) -> Self {
        Self {
            organizations: RwLock::new(organizations.into_iter().map(|o| (o.id, o)).collect()),
        }
    }
}

#[async_trait]
impl OrganizationRepository for MemoryOrganizationRepository {
    async fn all(&self) -> Result<Vec<Organization>, RepositoryError> {
        Ok(self.organizations.read().await.values().cloned().collect())
    }

    async fn get(&self, id: OrgId) -> Result<Option<Organization>, RepositoryError> {
        Ok(self.organizations.read().await.get(&id).cloned())
    }

    async fn create(&self, organization: Organization) -> Result<Organization, RepositoryError> {
        let mut organizations = self.organizations.write().await;
        if organizations.contains_key(&organization.id) {
            return Err(RepositoryError::Conflict(format!(
                "organization {} already exists",
                organization.id
            )));
        }
        organizations.insert(organization.id, organization.clone());
        Ok(organization)
    }
}

/// `sort_order` ascending, then newest first.
pub(crate) fn list_order(a: &Task, b: &Task) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

#[derive(Default)]
struct TaskTable {
    next_id: i64,
    rows: BTreeMap<TaskId, Task>,
}

#[derive(Default)]
pub struct MemoryTaskRepository {
    table: RwLock<TaskTable>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn get(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(
        &self,
        organizations: &[OrgId],
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, RepositoryError> {
        let table = self.table.read().await;
        let mut tasks: Vec<Task> = table
            .rows
            .values()
            .filter(|task| organizations.contains(&task.organization_id) && filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by(list_order);
        Ok(tasks)
    }

    async fn create(&self, mut task: Task) -> Result<Task, RepositoryError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        task.id = TaskId(table.next_id);
        table.rows.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, task: Task) -> Result<Option<Task>, RepositoryError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: TaskId) -> Result<bool, RepositoryError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    rows: BTreeMap<UserId, User>,
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<UserTable>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, mut user: User) -> Result<User, RepositoryError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepositoryError::Conflict(format!(
                "user '{}' already exists",
                user.email
            )));
        }
        table.next_id += 1;
        user.id = UserId(table.next_id);
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }
}
