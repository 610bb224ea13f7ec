//! Raw rows and their conversion into domain values.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use taskward_core::{OrgId, Organization, Role, Task, TaskId, User, UserId};
use taskward_runtime::RepositoryError;

pub(crate) fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn instant(column: &str, value: i64) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| RepositoryError::Corrupt(format!("{column}: {value} is out of range")))
}

fn corrupt(column: &str) -> impl FnOnce(taskward_core::UnknownVariant) -> RepositoryError + '_ {
    move |e| RepositoryError::Corrupt(format!("{column}: {e}"))
}

#[derive(Debug, FromRow)]
pub(crate) struct OrganizationRow {
    pub id: i64,
    pub name: String,
    pub parent_org_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = RepositoryError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Organization {
            id: OrgId(row.id),
            name: row.name,
            parent_org_id: row.parent_org_id.map(OrgId),
            created_at: instant("created_at", row.created_at)?,
            updated_at: instant("updated_at", row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub due_date: Option<i64>,
    pub owner_user_id: i64,
    pub organization_id: i64,
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: TaskId(row.id),
            title: row.title,
            description: row.description,
            status: row.status.parse().map_err(corrupt("status"))?,
            priority: row.priority.parse().map_err(corrupt("priority"))?,
            category: row.category,
            due_date: row
                .due_date
                .map(|value| instant("due_date", value))
                .transpose()?,
            owner_user_id: UserId(row.owner_user_id),
            organization_id: OrgId(row.organization_id),
            sort_order: row.sort_order,
            created_at: instant("created_at", row.created_at)?,
            updated_at: instant("updated_at", row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub organization_id: i64,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            organization_id: OrgId(row.organization_id),
            role: row.role.parse::<Role>().map_err(corrupt("role"))?,
            created_at: instant("created_at", row.created_at)?,
            updated_at: instant("updated_at", row.updated_at)?,
        })
    }
}
