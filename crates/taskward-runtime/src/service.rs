use crate::error::ServiceError;
use crate::repository::{OrganizationRepository, TaskRepository};
use chrono::Utc;
use std::sync::Arc;
use taskward_audit::{AuditError, AuditLogger, compute_json_diff};
use taskward_core::{
    NewTask, OrgId, Organization, Principal, Task, TaskFilter, TaskId, TaskPatch,
};
use taskward_policy::{AccessError, AccessibleOrgs, TaskOperation, TaskPolicy};
use tracing::{debug, info, warn};

/// Authorizes and executes task operations for a principal.
///
/// Every call fetches a fresh organization snapshot; the policy itself is
/// pure and never touches storage. Existence is checked before the policy,
/// so a missing task reports not-found regardless of who asks.
#[derive(Clone)]
pub struct TaskService {
    organizations: Arc<dyn OrganizationRepository>,
    tasks: Arc<dyn TaskRepository>,
    audit: Arc<AuditLogger>,
}

impl TaskService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        tasks: Arc<dyn TaskRepository>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            organizations,
            tasks,
            audit,
        }
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }

    /// Resolve the principal's policy against the current snapshot.
    pub async fn policy_for(&self, principal: &Principal) -> Result<TaskPolicy, ServiceError> {
        let snapshot = self.organizations.all().await?;
        Ok(TaskPolicy::resolve(*principal, &snapshot))
    }

    pub async fn accessible_organizations(
        &self,
        principal: &Principal,
    ) -> Result<AccessibleOrgs, ServiceError> {
        Ok(self.policy_for(principal).await?.accessible().clone())
    }

    pub async fn create(&self, principal: &Principal, new_task: NewTask) -> Result<Task, ServiceError> {
        let policy = self.policy_for(principal).await?;
        if let Err(denied) = policy.authorize_create() {
            return Err(self.denied(principal, TaskOperation::Create, None, denied).await);
        }
        new_task.validate().map_err(ServiceError::Validation)?;

        let draft = new_task.into_task(TaskId(0), principal, Utc::now());
        let task = self.tasks.create(draft).await?;

        info!(
            task = %task.id,
            user = %principal.user_id,
            org = %task.organization_id,
            "Task created"
        );
        self.record(self.audit.log_task_created(principal, task.id, &task.title).await);
        Ok(task)
    }

    /// Tasks in every accessible organization, optionally filtered.
    pub async fn list(&self, principal: &Principal, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError> {
        let policy = self.policy_for(principal).await?;
        let organizations = policy.accessible().to_sorted_vec();
        let tasks = self.tasks.list(&organizations, filter).await?;

        debug!(
            user = %principal.user_id,
            organizations = organizations.len(),
            count = tasks.len(),
            "Listed tasks"
        );
        let filters = serde_json::json!({
            "status": filter.status,
            "category": filter.category,
            "priority": filter.priority,
        });
        self.record(self.audit.log_tasks_listed(principal, filters, tasks.len()).await);
        Ok(tasks)
    }

    pub async fn get(&self, principal: &Principal, id: TaskId) -> Result<Task, ServiceError> {
        let task = self.load(id).await?;
        let policy = self.policy_for(principal).await?;
        if let Err(denied) = policy.authorize_read(&task.scope()) {
            return Err(self.denied(principal, TaskOperation::Read, Some(id), denied).await);
        }

        self.record(self.audit.log_task_viewed(principal, id).await);
        Ok(task)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, ServiceError> {
        let task = self.load(id).await?;
        let policy = self.policy_for(principal).await?;
        if let Err(denied) = policy.authorize_update(&task.scope()) {
            return Err(self.denied(principal, TaskOperation::Update, Some(id), denied).await);
        }
        patch.validate().map_err(ServiceError::Validation)?;

        let mut updated = task.clone();
        patch.apply(&mut updated, Utc::now());
        let updated = self
            .tasks
            .update(updated)
            .await?
            .ok_or_else(|| AccessError::task_not_found(id))?;

        let changes = diff_tasks(&task, &updated);
        info!(task = %id, user = %principal.user_id, "Task updated");
        self.record(self.audit.log_task_updated(principal, id, changes).await);
        Ok(updated)
    }

    pub async fn delete(&self, principal: &Principal, id: TaskId) -> Result<(), ServiceError> {
        let task = self.load(id).await?;
        let policy = self.policy_for(principal).await?;
        if let Err(denied) = policy.authorize_delete(&task.scope()) {
            return Err(self.denied(principal, TaskOperation::Delete, Some(id), denied).await);
        }

        if !self.tasks.delete(id).await? {
            return Err(AccessError::task_not_found(id).into());
        }

        info!(task = %id, user = %principal.user_id, "Task deleted");
        self.record(self.audit.log_task_deleted(principal, id, &task.title).await);
        Ok(())
    }

    pub async fn organizations(&self) -> Result<Vec<Organization>, ServiceError> {
        Ok(self.organizations.all().await?)
    }

    pub async fn organization(&self, id: OrgId) -> Result<Organization, ServiceError> {
        self.organizations
            .get(id)
            .await?
            .ok_or_else(|| AccessError::organization_not_found(id).into())
    }

    async fn load(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.tasks
            .get(id)
            .await?
            .ok_or_else(|| AccessError::task_not_found(id).into())
    }

    async fn denied(
        &self,
        principal: &Principal,
        operation: TaskOperation,
        task: Option<TaskId>,
        error: AccessError,
    ) -> ServiceError {
        warn!(
            user = %principal.user_id,
            role = %principal.role,
            operation = %operation,
            task = ?task,
            reason = %error,
            "Authorization denied"
        );
        self.record(
            self.audit
                .log_authorization_denied(principal, &operation.to_string(), task, &error.message)
                .await,
        );
        error.into()
    }

    /// Audit failures are logged and never fail the operation.
    fn record(&self, result: Result<(), AuditError>) {
        if let Err(e) = result {
            warn!(error = %e, "Failed to write audit event");
        }
    }
}

fn diff_tasks(before: &Task, after: &Task) -> serde_json::Value {
    match (serde_json::to_value(before), serde_json::to_value(after)) {
        (Ok(mut before), Ok(mut after)) => {
            // updatedAt always moves; it is not a change the caller asked for.
            for value in [&mut before, &mut after] {
                if let Some(object) = value.as_object_mut() {
                    object.remove("updatedAt");
                }
            }
            compute_json_diff(&before, &after)
        }
        _ => serde_json::Value::Null,
    }
}
