//! Task access policy.
//!
//! | Operation      | Permitted when                                              |
//! |----------------|-------------------------------------------------------------|
//! | Create         | role is Owner or Admin                                      |
//! | Read / List    | task organization is accessible                             |
//! | Update, Delete | task organization is accessible AND (role is Owner or Admin OR caller owns the task) |
//!
//! The predicates return `bool`; [`TaskPolicy`] turns them into
//! [`AccessError`]s for the request layer.

use crate::error::AccessError;
use crate::hierarchy::{AccessibleOrgs, accessible_org_ids};
use crate::request::{AccessRequest, TaskOperation};
use taskward_core::{Organization, Principal, Role, TaskScope};

/// Whether `role` may create tasks.
pub fn can_create(role: Role) -> bool {
    role.is_elevated()
}

/// Whether a task in `task.organization_id` is visible. No ownership check.
pub fn can_read(task: &TaskScope, accessible: &AccessibleOrgs) -> bool {
    accessible.contains(task.organization_id)
}

/// Whether `principal` may update or delete `task`.
pub fn can_mutate(task: &TaskScope, principal: &Principal, accessible: &AccessibleOrgs) -> bool {
    can_read(task, accessible)
        && (principal.role.is_elevated() || task.owner_user_id == principal.user_id)
}

/// A principal bound to its resolved accessible organizations.
///
/// Resolve once per request, then authorize any number of operations.
#[derive(Debug, Clone)]
pub struct TaskPolicy {
    principal: Principal,
    accessible: AccessibleOrgs,
}

impl TaskPolicy {
    pub fn new(principal: Principal, accessible: AccessibleOrgs) -> Self {
        Self {
            principal,
            accessible,
        }
    }

    /// Resolve the accessible set from an organization snapshot.
    pub fn resolve(principal: Principal, organizations: &[Organization]) -> Self {
        let accessible =
            accessible_org_ids(principal.organization_id, principal.role, organizations);
        Self::new(principal, accessible)
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn accessible(&self) -> &AccessibleOrgs {
        &self.accessible
    }

    pub fn authorize_create(&self) -> Result<(), AccessError> {
        if can_create(self.principal.role) {
            Ok(())
        } else {
            self.deny(TaskOperation::Create, AccessError::create_denied(self.principal.role))
        }
    }

    pub fn authorize_read(&self, task: &TaskScope) -> Result<(), AccessError> {
        self.authorize_visible(TaskOperation::Read, task)
    }

    pub fn authorize_update(&self, task: &TaskScope) -> Result<(), AccessError> {
        self.authorize_mutation(TaskOperation::Update, task)
    }

    pub fn authorize_delete(&self, task: &TaskScope) -> Result<(), AccessError> {
        self.authorize_mutation(TaskOperation::Delete, task)
    }

    /// Authorize a request built elsewhere. `List` always passes: listing is
    /// confined by filtering on [`Self::accessible`].
    pub fn authorize(&self, request: &AccessRequest<'_>) -> Result<(), AccessError> {
        match (request.operation, request.task) {
            (TaskOperation::Create, _) => self.authorize_create(),
            (TaskOperation::List, _) => Ok(()),
            (TaskOperation::Read, Some(task)) => self.authorize_read(&task),
            (TaskOperation::Update, Some(task)) => self.authorize_update(&task),
            (TaskOperation::Delete, Some(task)) => self.authorize_delete(&task),
            (operation, None) => self.deny(
                operation,
                AccessError::new(
                    crate::AccessErrorKind::AuthorizationDenied,
                    format!("{operation} requires a target task"),
                ),
            ),
        }
    }

    /// Require at least `required` for non-task operations (e.g. audit log).
    pub fn require_role(&self, required: Role) -> Result<(), AccessError> {
        if self.principal.role.has_level(required) {
            Ok(())
        } else {
            Err(AccessError::role_denied(required, self.principal.role))
        }
    }

    fn authorize_visible(&self, operation: TaskOperation, task: &TaskScope) -> Result<(), AccessError> {
        if can_read(task, &self.accessible) {
            Ok(())
        } else {
            self.deny(
                operation,
                AccessError::organization_denied(operation, task.organization_id),
            )
        }
    }

    fn authorize_mutation(&self, operation: TaskOperation, task: &TaskScope) -> Result<(), AccessError> {
        self.authorize_visible(operation, task)?;
        if can_mutate(task, &self.principal, &self.accessible) {
            Ok(())
        } else {
            self.deny(operation, AccessError::ownership_denied(operation))
        }
    }

    fn deny(&self, operation: TaskOperation, error: AccessError) -> Result<(), AccessError> {
        tracing::debug!(
            user = %self.principal.user_id,
            role = %self.principal.role,
            org = %self.principal.organization_id,
            operation = %operation,
            reason = %error,
            "Task access denied"
        );
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessErrorKind;
    use taskward_core::{OrgId, UserId};

    fn orgs() -> Vec<Organization> {
        vec![
            Organization::new(OrgId(1), "HQ", None),
            Organization::new(OrgId(2), "Engineering", Some(OrgId(1))),
        ]
    }

    fn policy(user: i64, role: Role, org: i64) -> TaskPolicy {
        TaskPolicy::resolve(Principal::new(UserId(user), role, OrgId(org)), &orgs())
    }

    #[test]
    fn resolve_matches_hierarchy_for_every_role() {
        for role in Role::ALL {
            assert_eq!(
                policy(1, role, 1).accessible().as_set(),
                accessible_org_ids(OrgId(1), role, &orgs()).as_set()
            );
        }
        assert_eq!(policy(1, Role::Owner, 1).accessible().len(), 2);
    }

    #[test]
    fn create_requires_elevated_role() {
        assert!(policy(1, Role::Owner, 1).authorize_create().is_ok());
        assert!(policy(2, Role::Admin, 2).authorize_create().is_ok());
        let err = policy(3, Role::Viewer, 2).authorize_create().unwrap_err();
        assert_eq!(err.kind, AccessErrorKind::AuthorizationDenied);
    }

    #[test]
    fn viewer_reads_own_org_but_not_parent() {
        let viewer = policy(3, Role::Viewer, 2);
        assert!(viewer.authorize_read(&TaskScope::new(UserId(9), OrgId(2))).is_ok());
        assert!(viewer.authorize_read(&TaskScope::new(UserId(9), OrgId(1))).is_err());
    }

    #[test]
    fn viewer_mutates_only_own_tasks() {
        let viewer = policy(3, Role::Viewer, 2);
        assert!(viewer.authorize_update(&TaskScope::new(UserId(3), OrgId(2))).is_ok());
        assert!(viewer.authorize_delete(&TaskScope::new(UserId(3), OrgId(2))).is_ok());
        let err = viewer
            .authorize_update(&TaskScope::new(UserId(2), OrgId(2)))
            .unwrap_err();
        assert!(err.is_denied());
    }

    #[test]
    fn owner_mutates_descendant_tasks() {
        let owner = policy(1, Role::Owner, 1);
        assert!(owner.authorize_delete(&TaskScope::new(UserId(2), OrgId(2))).is_ok());
    }

    #[test]
    fn own_task_outside_reach_is_denied() {
        // Ownership alone never widens reach.
        let admin = policy(2, Role::Admin, 2);
        assert!(admin.authorize_update(&TaskScope::new(UserId(2), OrgId(1))).is_err());
    }

    #[test]
    fn require_role_compares_levels() {
        assert!(policy(1, Role::Owner, 1).require_role(Role::Admin).is_ok());
        assert!(policy(2, Role::Admin, 2).require_role(Role::Admin).is_ok());
        assert!(policy(3, Role::Viewer, 2).require_role(Role::Admin).is_err());
    }

    #[test]
    fn authorize_dispatches_on_operation() {
        let viewer = policy(3, Role::Viewer, 2);
        let principal = *viewer.principal();
        assert!(viewer.authorize(&AccessRequest::create(&principal)).is_err());
        assert!(
            viewer
                .authorize(&AccessRequest::on_task(
                    TaskOperation::Read,
                    &principal,
                    TaskScope::new(UserId(2), OrgId(2)),
                ))
                .is_ok()
        );
        let missing_target = AccessRequest {
            operation: TaskOperation::Delete,
            principal: &principal,
            task: None,
        };
        assert!(viewer.authorize(&missing_target).is_err());
    }
}
