//! Access error types.

use crate::request::TaskOperation;
use taskward_core::{OrgId, Role, TaskId};

/// A refused or unresolvable access request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AccessError {
    pub kind: AccessErrorKind,
    pub message: String,
}

/// Categories of access errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessErrorKind {
    /// The policy predicate evaluated to false.
    AuthorizationDenied,
    /// The target does not exist. Reported before any policy check.
    NotFound,
}

impl AccessError {
    pub fn new(kind: AccessErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn task_not_found(id: TaskId) -> Self {
        Self::new(AccessErrorKind::NotFound, format!("Task with ID {id} not found"))
    }

    pub fn organization_not_found(id: OrgId) -> Self {
        Self::new(
            AccessErrorKind::NotFound,
            format!("Organization with ID {id} not found"),
        )
    }

    pub fn create_denied(role: Role) -> Self {
        Self::new(
            AccessErrorKind::AuthorizationDenied,
            format!("Role {role} is not allowed to create tasks"),
        )
    }

    pub fn organization_denied(operation: TaskOperation, org: OrgId) -> Self {
        Self::new(
            AccessErrorKind::AuthorizationDenied,
            format!("{operation} denied: organization {org} is outside your reach"),
        )
    }

    pub fn ownership_denied(operation: TaskOperation) -> Self {
        Self::new(
            AccessErrorKind::AuthorizationDenied,
            format!("{operation} denied: only the task owner, an Admin or an Owner may do this"),
        )
    }

    pub fn role_denied(required: Role, actual: Role) -> Self {
        Self::new(
            AccessErrorKind::AuthorizationDenied,
            format!("Requires role {required} or higher (have {actual})"),
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == AccessErrorKind::NotFound
    }

    pub fn is_denied(&self) -> bool {
        self.kind == AccessErrorKind::AuthorizationDenied
    }
}
