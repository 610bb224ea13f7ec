//! # taskward-audit
//!
//! Audit trail for Taskward.
//!
//! Every authentication and task operation is recorded as an [`AuditEvent`]
//! carrying the acting principal, the resource touched and optional details.
//! Events go to a pluggable [`AuditStorage`]:
//!
//! - [`MemoryStorage`]: process-local, queryable
//! - [`FileStorage`]: JSON Lines on disk plus an in-memory index for queries
//! - [`ConsoleStorage`]: human-readable lines on stdout
//! - [`NullStorage`]: discards everything
//! - [`DualStorage`]: any of the above echoed to the console
//!
//! ## Actions
//!
//! | Action | Recorded when |
//! |--------|---------------|
//! | `LOGIN` / `LOGOUT` | a user signs in or out |
//! | `CREATE_TASK` / `UPDATE_TASK` / `DELETE_TASK` | a task mutation succeeds |
//! | `VIEW_TASK` / `VIEW_TASKS` | a task or task list is read |
//! | `CREATE_USER` | an account is created (seeding) |
//! | `AUTHORIZATION_DENIED` | the access policy refuses a request |
//!
//! ```rust,no_run
//! use taskward_audit::{AuditFilter, AuditLogger};
//! use taskward_core::{AuditConfig, OrgId, Principal, Role, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let logger = AuditLogger::new(AuditConfig::default())?;
//! let principal = Principal::new(UserId(1), Role::Owner, OrgId(1));
//!
//! logger.log_login(&principal, "owner@example.com").await?;
//!
//! let recent = logger.query(AuditFilter::for_user(UserId(1))).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod logger;
pub mod storage;

pub use error::AuditError;
pub use event::{AuditAction, AuditEvent, AuditEventBuilder, compute_json_diff};
pub use logger::{AuditFilter, AuditLogger};
pub use storage::{
    AuditStorage, ConsoleStorage, DualStorage, FileStorage, MemoryStorage, NullStorage,
};
