//! Task service orchestration.
//!
//! [`TaskService`] is the only path from a request to storage. For every
//! operation it loads what it needs through the repository traits, resolves
//! the caller's accessible organizations, consults the access policy, and
//! records an audit event.

pub mod error;
pub mod memory;
pub mod repository;
pub mod service;

pub use error::{RepositoryError, ServiceError};
pub use memory::{MemoryOrganizationRepository, MemoryTaskRepository, MemoryUserRepository};
pub use repository::{OrganizationRepository, TaskRepository, UserRepository};
pub use service::TaskService;
