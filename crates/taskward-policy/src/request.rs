//! Access request types.

use serde::{Deserialize, Serialize};
use std::fmt;
use taskward_core::{Principal, TaskScope};

/// The task operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskOperation {
    Create,
    /// Single task by id.
    Read,
    List,
    Update,
    Delete,
}

impl TaskOperation {
    pub fn is_mutation(self) -> bool {
        matches!(self, TaskOperation::Update | TaskOperation::Delete)
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOperation::Create => write!(f, "CREATE"),
            TaskOperation::Read => write!(f, "READ"),
            TaskOperation::List => write!(f, "LIST"),
            TaskOperation::Update => write!(f, "UPDATE"),
            TaskOperation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Everything a single task decision looks at.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub operation: TaskOperation,
    pub principal: &'a Principal,
    /// The existing task. `None` for `Create` and `List`.
    pub task: Option<TaskScope>,
}

impl<'a> AccessRequest<'a> {
    pub fn create(principal: &'a Principal) -> Self {
        Self {
            operation: TaskOperation::Create,
            principal,
            task: None,
        }
    }

    pub fn on_task(operation: TaskOperation, principal: &'a Principal, task: TaskScope) -> Self {
        Self {
            operation,
            principal,
            task: Some(task),
        }
    }
}
