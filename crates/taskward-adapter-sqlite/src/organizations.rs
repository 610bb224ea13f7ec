use crate::rows::{OrganizationRow, millis};
use crate::storage_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use taskward_core::{OrgId, Organization};
use taskward_runtime::{OrganizationRepository, RepositoryError};

const COLUMNS: &str = "id, name, parent_org_id, created_at, updated_at";

pub struct SqliteOrganizationRepository {
    pool: SqlitePool,
}

impl SqliteOrganizationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationRepository for SqliteOrganizationRepository {
    async fn all(&self) -> Result<Vec<Organization>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {COLUMNS} FROM organizations ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(Organization::try_from).collect()
    }

    async fn get(&self, id: OrgId) -> Result<Option<Organization>, RepositoryError> {
        sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {COLUMNS} FROM organizations WHERE id = ?"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(Organization::try_from)
        .transpose()
    }

    async fn create(&self, organization: Organization) -> Result<Organization, RepositoryError> {
        sqlx::query(
            "INSERT INTO organizations (id, name, parent_org_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(organization.id.get())
        .bind(&organization.name)
        .bind(organization.parent_org_id.map(OrgId::get))
        .bind(millis(organization.created_at))
        .bind(millis(organization.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match storage_error(e) {
            RepositoryError::Conflict(_) => RepositoryError::Conflict(format!(
                "organization {} already exists or has an unknown parent",
                organization.id
            )),
            other => other,
        })?;

        Ok(organization)
    }
}
