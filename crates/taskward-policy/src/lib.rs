//! Taskward access control.
//!
//! Two pure units decide every task request before storage is touched:
//!
//! - [`hierarchy`] resolves the organizations a principal may act upon. An
//!   Owner reaches its own organization and every descendant; Admin and
//!   Viewer are confined to their own organization.
//! - [`task`] decides create / read / update / delete against a task's owner
//!   and organization, given the accessible set.
//!
//! Neither holds state or performs I/O. Callers fetch an organization
//! snapshot, resolve the accessible set once, and consult [`TaskPolicy`].

pub mod error;
pub mod hierarchy;
pub mod request;
pub mod task;

pub use error::{AccessError, AccessErrorKind};
pub use hierarchy::{
    AccessibleOrgs, OrgIndex, accessible_org_ids, can_access_organization, descendants,
};
pub use request::{AccessRequest, TaskOperation};
pub use task::{TaskPolicy, can_create, can_mutate, can_read};
