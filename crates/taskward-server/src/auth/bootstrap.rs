//! Startup wiring: storage backend, seed data and signing keys.

use super::password::hash_password;
use crate::state::AppState;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use taskward_adapter_sqlite::SqliteStore;
use taskward_audit::AuditLogger;
use taskward_biscuit::{KeyPair, KeySource};
use taskward_core::{
    DatabaseBackend, NewTask, SeedConfig, TaskId, TaskwardConfig, User, UserId,
};
use taskward_runtime::{
    MemoryOrganizationRepository, MemoryTaskRepository, MemoryUserRepository,
    OrganizationRepository, TaskRepository, TaskService, UserRepository,
};

/// The three repositories behind one backend.
pub struct Repositories {
    pub organizations: Arc<dyn OrganizationRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            organizations: Arc::new(MemoryOrganizationRepository::new()),
            tasks: Arc::new(MemoryTaskRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
        }
    }

    pub async fn open(config: &TaskwardConfig) -> anyhow::Result<Self> {
        match config.database.backend {
            DatabaseBackend::Memory => {
                tracing::info!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
            DatabaseBackend::Sqlite => {
                let store = SqliteStore::connect(&config.database).await?;
                store.migrate().await?;
                Ok(Self {
                    organizations: Arc::new(store.organizations()),
                    tasks: Arc::new(store.tasks()),
                    users: Arc::new(store.users()),
                })
            }
        }
    }
}

/// Build the shared state from configuration.
pub async fn build_state(config: &TaskwardConfig) -> anyhow::Result<Arc<AppState>> {
    let audit = Arc::new(AuditLogger::new(config.audit.clone())?);
    let repositories = Repositories::open(config).await?;

    seed_if_empty(&config.seed, &repositories, &audit).await?;

    let (keypair, source) = KeyPair::resolve(&config.biscuit)?;
    if source == KeySource::Ephemeral {
        tracing::warn!("Tokens issued by this process will not verify after a restart");
    }
    let token_lifetime = chrono::Duration::from_std(config.biscuit.token_lifetime()?)?;

    let service = TaskService::new(repositories.organizations, repositories.tasks, audit);
    Ok(Arc::new(
        AppState::new(service, repositories.users, keypair, token_lifetime)
            .with_registration(config.server.allow_registration),
    ))
}

/// Apply the seed section when the store holds no organizations.
///
/// Returns whether anything was written.
pub async fn seed_if_empty(
    seed: &SeedConfig,
    repositories: &Repositories,
    audit: &AuditLogger,
) -> anyhow::Result<bool> {
    if seed.is_empty() || !repositories.organizations.all().await?.is_empty() {
        return Ok(false);
    }
    seed.validate()?;

    // Parents first so foreign keys hold.
    let mut pending = seed.organization_records();
    while !pending.is_empty() {
        let existing: Vec<_> = repositories
            .organizations
            .all()
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();
        let (ready, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|org| {
            org.parent_org_id
                .is_none_or(|parent| existing.contains(&parent))
        });
        if ready.is_empty() {
            anyhow::bail!("seed organizations reference parents that cannot be created");
        }
        for org in ready {
            repositories.organizations.create(org).await?;
        }
        pending = rest;
    }

    let now = Utc::now();
    let mut by_email: HashMap<String, User> = HashMap::new();
    for seed_user in &seed.users {
        let password = seed_user.resolve_password().ok_or_else(|| {
            anyhow::anyhow!("seed user '{}' has no password", seed_user.email)
        })?;
        let user = repositories
            .users
            .create(User {
                id: UserId(0),
                email: seed_user.email.trim().to_string(),
                first_name: seed_user.first_name.clone(),
                last_name: seed_user.last_name.clone(),
                password_hash: hash_password(&password)?,
                organization_id: seed_user.organization_id,
                role: seed_user.role,
                created_at: now,
                updated_at: now,
            })
            .await?;

        if let Err(e) = audit.log_user_created(user.id, &user.email).await {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
        by_email.insert(user.email.to_ascii_lowercase(), user);
    }

    for seed_task in &seed.tasks {
        let owner = by_email
            .get(&seed_task.owner.trim().to_ascii_lowercase())
            .ok_or_else(|| anyhow::anyhow!("seed task owner '{}' is unknown", seed_task.owner))?;
        let task = NewTask {
            title: seed_task.title.clone(),
            description: seed_task.description.clone(),
            status: Some(seed_task.status),
            priority: Some(seed_task.priority),
            category: seed_task.category.clone(),
            due_date: None,
            sort_order: Some(seed_task.sort_order),
        }
        .into_task(TaskId(0), &owner.principal(), now);
        repositories.tasks.create(task).await?;
    }

    tracing::info!(
        organizations = seed.organizations.len(),
        users = seed.users.len(),
        tasks = seed.tasks.len(),
        "Seeded empty store"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskward_core::{OrgId, Role, SeedOrganization, SeedTask, SeedUser, TaskFilter};

    fn seed() -> SeedConfig {
        SeedConfig {
            // Child listed before its parent on purpose.
            organizations: vec![
                SeedOrganization {
                    id: OrgId(2),
                    name: "Engineering Department".into(),
                    parent_id: Some(OrgId(1)),
                },
                SeedOrganization {
                    id: OrgId(1),
                    name: "TurboVets HQ".into(),
                    parent_id: None,
                },
            ],
            users: vec![SeedUser {
                email: "viewer@turbovets.com".into(),
                password: Some("Password123!".into()),
                password_env: None,
                first_name: "Bob".into(),
                last_name: "Viewer".into(),
                role: Role::Viewer,
                organization_id: OrgId(2),
            }],
            tasks: vec![SeedTask {
                title: "Prepare for Demo".into(),
                description: None,
                status: Default::default(),
                priority: Default::default(),
                category: Some("Personal".into()),
                sort_order: 5,
                owner: "viewer@turbovets.com".into(),
            }],
        }
    }

    #[tokio::test]
    async fn seed_runs_once() {
        let repositories = Repositories::in_memory();
        let audit = AuditLogger::in_memory();

        assert!(seed_if_empty(&seed(), &repositories, &audit).await.unwrap());
        assert!(!seed_if_empty(&seed(), &repositories, &audit).await.unwrap());

        assert_eq!(repositories.organizations.all().await.unwrap().len(), 2);
        let viewer = repositories
            .users
            .find_by_email("viewer@turbovets.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(viewer.password_hash, "Password123!");

        let tasks = repositories
            .tasks
            .list(&[OrgId(2)], &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].owner_user_id, viewer.id);
        assert_eq!(tasks[0].category, "Personal");
    }
}
