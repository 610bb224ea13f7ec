//! Audit logger implementation.
//!
//! [`AuditLogger`] wraps a storage backend with typed helpers for each
//! [`AuditAction`] and clamps query sizes to the configured maximum.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use taskward_core::{AuditConfig, Principal, TaskId, UserId};

use crate::error::AuditError;
use crate::event::{AuditAction, AuditEvent};
use crate::storage::{AuditStorage, DualStorage, FileStorage, MemoryStorage, NullStorage};

/// The main audit logger.
pub struct AuditLogger {
    config: AuditConfig,
    storage: Arc<dyn AuditStorage>,
}

impl AuditLogger {
    /// Create a logger from configuration.
    ///
    /// Disabled: nothing is stored. With `file_path`: JSON Lines on disk.
    /// Otherwise events are kept in memory only. Either way queries see the
    /// newest `retained_events`. `stdout` echoes every event.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let storage: Arc<dyn AuditStorage> = if !config.enabled {
            Arc::new(NullStorage::new())
        } else {
            let primary: Arc<dyn AuditStorage> = match &config.file_path {
                Some(path) => Arc::new(
                    FileStorage::open_with_retention(path, config.retained_events).map_err(
                        |e| AuditError::InitializationFailed(format!("{}: {e}", path.display())),
                    )?,
                ),
                None => Arc::new(MemoryStorage::with_retention(config.retained_events)),
            };
            if config.stdout {
                Arc::new(DualStorage::new(primary))
            } else {
                primary
            }
        };

        Ok(Self { config, storage })
    }

    /// Create a logger with a custom storage backend.
    pub fn with_storage(config: AuditConfig, storage: Arc<dyn AuditStorage>) -> Self {
        Self { config, storage }
    }

    /// Create a disabled (no-op) logger.
    pub fn disabled() -> Self {
        Self {
            config: AuditConfig {
                enabled: false,
                ..Default::default()
            },
            storage: Arc::new(NullStorage::new()),
        }
    }

    /// In-memory logger without console echo, used by tests.
    pub fn in_memory() -> Self {
        Self::with_storage(
            AuditConfig {
                stdout: false,
                ..Default::default()
            },
            Arc::new(MemoryStorage::new()),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn max_query_results(&self) -> usize {
        self.config.max_query_results
    }

    /// Log an audit event.
    pub async fn log(&self, event: AuditEvent) -> Result<(), AuditError> {
        if !self.config.enabled {
            return Ok(());
        }

        tracing::debug!(
            event_id = %event.event_id,
            action = %event.action,
            user = ?event.user_id,
            resource = %event.resource,
            resource_id = ?event.resource_id,
            "Audit event"
        );

        self.storage.store(event).await
    }

    pub async fn log_login(&self, principal: &Principal, email: &str) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::Login, "auth")
            .principal(principal)
            .details(json!({ "email": email }))
            .build();
        self.log(event).await
    }

    /// A login attempt that did not match any account or password.
    pub async fn log_login_failed(&self, email: &str) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::Login, "auth")
            .details(json!({ "email": email }))
            .error("invalid credentials")
            .build();
        self.log(event).await
    }

    pub async fn log_logout(&self, principal: &Principal) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::Logout, "auth")
            .principal(principal)
            .build();
        self.log(event).await
    }

    pub async fn log_task_created(
        &self,
        principal: &Principal,
        task_id: TaskId,
        title: &str,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::CreateTask, "task")
            .principal(principal)
            .resource_id(task_id)
            .details(json!({ "title": title }))
            .build();
        self.log(event).await
    }

    /// `changes` is a field diff as produced by [`crate::compute_json_diff`].
    pub async fn log_task_updated(
        &self,
        principal: &Principal,
        task_id: TaskId,
        changes: serde_json::Value,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::UpdateTask, "task")
            .principal(principal)
            .resource_id(task_id)
            .details(json!({ "changes": changes }))
            .build();
        self.log(event).await
    }

    pub async fn log_task_deleted(
        &self,
        principal: &Principal,
        task_id: TaskId,
        title: &str,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::DeleteTask, "task")
            .principal(principal)
            .resource_id(task_id)
            .details(json!({ "title": title }))
            .build();
        self.log(event).await
    }

    pub async fn log_task_viewed(
        &self,
        principal: &Principal,
        task_id: TaskId,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::ViewTask, "task")
            .principal(principal)
            .resource_id(task_id)
            .build();
        self.log(event).await
    }

    pub async fn log_tasks_listed(
        &self,
        principal: &Principal,
        filters: serde_json::Value,
        count: usize,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::ViewTasks, "task")
            .principal(principal)
            .details(json!({ "filters": filters, "count": count }))
            .build();
        self.log(event).await
    }

    pub async fn log_user_created(&self, user_id: UserId, email: &str) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditAction::CreateUser, "user")
            .user_id(user_id)
            .resource_id(user_id)
            .details(json!({ "email": email }))
            .build();
        self.log(event).await
    }

    /// A request refused by the access policy.
    pub async fn log_authorization_denied(
        &self,
        principal: &Principal,
        operation: &str,
        resource_id: Option<TaskId>,
        reason: &str,
    ) -> Result<(), AuditError> {
        let mut builder = AuditEvent::builder(AuditAction::AuthorizationDenied, "task")
            .principal(principal)
            .details(json!({ "operation": operation }))
            .error(reason);
        if let Some(id) = resource_id {
            builder = builder.resource_id(id);
        }
        self.log(builder.build()).await
    }

    /// Query audit events, newest first. The limit is clamped to
    /// `max_query_results`.
    pub async fn query(&self, mut filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        let max = self.config.max_query_results;
        filter.limit = Some(filter.limit.map_or(max, |limit| limit.min(max)));
        self.storage.query(filter).await
    }

    /// Get an audit event by ID.
    pub async fn get(&self, event_id: uuid::Uuid) -> Result<Option<AuditEvent>, AuditError> {
        self.storage.get(event_id).await
    }
}

/// Filter for querying audit events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub user_id: Option<UserId>,
    pub action: Option<AuditAction>,
    /// Inclusive lower bound.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AuditFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(user) = self.user_id
            && event.user_id != Some(user)
        {
            return false;
        }
        if let Some(action) = self.action
            && event.action != action
        {
            return false;
        }
        if let Some(start) = self.start_time
            && event.occurred_at < start
        {
            return false;
        }
        if let Some(end) = self.end_time
            && event.occurred_at > end
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskward_core::{OrgId, Role};

    fn admin() -> Principal {
        Principal::new(UserId(2), Role::Admin, OrgId(2))
    }

    #[tokio::test]
    async fn test_disabled_logger() {
        let logger = AuditLogger::disabled();
        assert!(!logger.is_enabled());

        logger.log_login(&admin(), "admin@example.com").await.unwrap();
        assert!(logger.query(AuditFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_task_lifecycle_is_recorded() {
        let logger = AuditLogger::in_memory();
        let principal = admin();

        logger.log_task_created(&principal, TaskId(1), "Draft").await.unwrap();
        logger
            .log_task_updated(&principal, TaskId(1), json!({ "title": { "old": "Draft", "new": "Final" } }))
            .await
            .unwrap();
        logger.log_task_deleted(&principal, TaskId(1), "Final").await.unwrap();

        let events = logger.query(AuditFilter::for_user(UserId(2))).await.unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.resource_id.as_deref() == Some("1")));
    }

    #[tokio::test]
    async fn test_query_limit_is_clamped() {
        let logger = AuditLogger::with_storage(
            AuditConfig {
                stdout: false,
                max_query_results: 2,
                ..Default::default()
            },
            Arc::new(MemoryStorage::new()),
        );
        for id in 0..5 {
            logger.log_task_viewed(&admin(), TaskId(id)).await.unwrap();
        }

        let unbounded = logger.query(AuditFilter::default()).await.unwrap();
        assert_eq!(unbounded.len(), 2);

        let asked_more = logger
            .query(AuditFilter {
                limit: Some(50),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(asked_more.len(), 2);
    }

    #[tokio::test]
    async fn test_filter_by_action() {
        let logger = AuditLogger::in_memory();
        logger.log_login(&admin(), "admin@example.com").await.unwrap();
        logger
            .log_authorization_denied(&admin(), "DELETE", Some(TaskId(9)), "not yours")
            .await
            .unwrap();

        let denied = logger
            .query(AuditFilter {
                action: Some(AuditAction::AuthorizationDenied),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].error.as_deref(), Some("not yours"));
    }

    #[test]
    fn test_filter_time_bounds_are_inclusive() {
        let event = AuditEvent::new(AuditAction::Logout, "auth");
        let at = event.occurred_at;
        let filter = AuditFilter {
            start_time: Some(at),
            end_time: Some(at),
            ..Default::default()
        };
        assert!(filter.matches(&event));
        assert!(
            !AuditFilter {
                end_time: Some(at - chrono::Duration::seconds(1)),
                ..Default::default()
            }
            .matches(&event)
        );
    }
}
