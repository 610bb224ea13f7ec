//! Audit event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskward_core::{OrgId, Principal, Role, UnknownVariant, UserId};
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    Logout,
    CreateTask,
    UpdateTask,
    DeleteTask,
    ViewTask,
    ViewTasks,
    CreateUser,
    AuthorizationDenied,
}

impl AuditAction {
    pub const ALL: [AuditAction; 9] = [
        AuditAction::Login,
        AuditAction::Logout,
        AuditAction::CreateTask,
        AuditAction::UpdateTask,
        AuditAction::DeleteTask,
        AuditAction::ViewTask,
        AuditAction::ViewTasks,
        AuditAction::CreateUser,
        AuditAction::AuthorizationDenied,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::CreateTask => "CREATE_TASK",
            Self::UpdateTask => "UPDATE_TASK",
            Self::DeleteTask => "DELETE_TASK",
            Self::ViewTask => "VIEW_TASK",
            Self::ViewTasks => "VIEW_TASKS",
            Self::CreateUser => "CREATE_USER",
            Self::AuthorizationDenied => "AUTHORIZATION_DENIED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVariant::new("audit action", s))
    }
}

/// An audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: Uuid,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,

    pub action: AuditAction,

    /// Acting user. Absent for failed logins of unknown accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrgId>,

    /// Resource kind, e.g. `task` or `auth`.
    pub resource: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Free-form context (changed fields, filters, result counts).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,

    /// Denial reason or failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, resource: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            action,
            user_id: None,
            role: None,
            organization_id: None,
            resource: resource.into(),
            resource_id: None,
            details: serde_json::Value::Null,
            error: None,
        }
    }

    pub fn builder(action: AuditAction, resource: impl Into<String>) -> AuditEventBuilder {
        AuditEventBuilder::new(action, resource)
    }

    /// Format the event as a human-readable log line.
    ///
    /// Format: `[timestamp] ACTION user=... role=... org=... resource=...[/id]`
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] {}",
            self.occurred_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.action,
        );

        if let Some(user) = self.user_id {
            line.push_str(&format!(" user={user}"));
        }
        if let Some(role) = self.role {
            line.push_str(&format!(" role={role}"));
        }
        if let Some(org) = self.organization_id {
            line.push_str(&format!(" org={org}"));
        }

        line.push_str(&format!(" resource={}", self.resource));
        if let Some(ref id) = self.resource_id {
            line.push_str(&format!("/{id}"));
        }

        if let Some(ref error) = self.error {
            line.push_str(&format!(" error=\"{}\"", error.replace('"', "'")));
        }

        if let Some(changes) = self.details.get("changes").and_then(|c| c.as_object()) {
            let fields: Vec<&str> = changes.keys().map(String::as_str).collect();
            if !fields.is_empty() {
                line.push_str(&format!(" changed_fields=[{}]", fields.join(",")));
            }
        }

        line
    }
}

/// Builder for creating audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    event: AuditEvent,
}

impl AuditEventBuilder {
    pub fn new(action: AuditAction, resource: impl Into<String>) -> Self {
        Self {
            event: AuditEvent::new(action, resource),
        }
    }

    /// Fill user, role and organization from the acting principal.
    pub fn principal(mut self, principal: &Principal) -> Self {
        self.event.user_id = Some(principal.user_id);
        self.event.role = Some(principal.role);
        self.event.organization_id = Some(principal.organization_id);
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.event.user_id = Some(user_id);
        self
    }

    pub fn resource_id(mut self, id: impl ToString) -> Self {
        self.event.resource_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.event.details = details;
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.event.error = Some(error.into());
        self
    }

    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.event.occurred_at = at;
        self
    }

    pub fn build(self) -> AuditEvent {
        self.event
    }
}

/// Field-level diff between two JSON objects: `{ field: { old, new } }`.
/// Returns `Null` when nothing changed.
pub fn compute_json_diff(before: &serde_json::Value, after: &serde_json::Value) -> serde_json::Value {
    use serde_json::{Map, Value, json};

    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut diff = Map::new();

            for (key, before_val) in before_obj {
                let after_val = after_obj.get(key).unwrap_or(&Value::Null);
                if before_val != after_val {
                    diff.insert(key.clone(), json!({ "old": before_val, "new": after_val }));
                }
            }
            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    diff.insert(key.clone(), json!({ "old": null, "new": after_val }));
                }
            }

            if diff.is_empty() {
                Value::Null
            } else {
                Value::Object(diff)
            }
        }
        _ if before != after => json!({ "old": before, "new": after }),
        _ => Value::Null,
    }
}
