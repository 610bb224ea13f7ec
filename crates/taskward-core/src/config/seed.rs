//! Seed data applied to an empty store at startup.

use super::ConfigError;
use crate::{OrgId, Organization, Role, TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Organizations, users and tasks to create when the store is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub organizations: Vec<SeedOrganization>,

    #[serde(default)]
    pub users: Vec<SeedUser>,

    #[serde(default)]
    pub tasks: Vec<SeedTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOrganization {
    pub id: OrgId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<OrgId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub email: String,

    /// Plain-text password, hashed at seed time.
    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the password. Wins over `password`.
    #[serde(default)]
    pub password_env: Option<String>,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    pub role: Role,
    pub organization_id: OrgId,
}

impl SeedUser {
    /// The configured password, if any.
    pub fn resolve_password(&self) -> Option<String> {
        if let Some(var) = &self.password_env
            && let Ok(value) = std::env::var(var)
        {
            return Some(value);
        }
        self.password.clone()
    }
}

/// A seed task. It is placed in its owner's organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    /// Email of a seeded user.
    pub owner: String,
}

impl SeedConfig {
    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty() && self.users.is_empty() && self.tasks.is_empty()
    }

    /// Seed organizations as domain records.
    pub fn organization_records(&self) -> Vec<Organization> {
        self.organizations
            .iter()
            .map(|org| Organization::new(org.id, org.name.clone(), org.parent_id))
            .collect()
    }

    /// Reject seed data that would break the organization forest or leave
    /// dangling references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut parents: HashMap<OrgId, Option<OrgId>> = HashMap::new();
        for org in &self.organizations {
            if parents.insert(org.id, org.parent_id).is_some() {
                return Err(ConfigError::Config(format!(
                    "duplicate seed organization id {}",
                    org.id
                )));
            }
        }

        for org in &self.organizations {
            if let Some(parent) = org.parent_id
                && !parents.contains_key(&parent)
            {
                return Err(ConfigError::Config(format!(
                    "seed organization {} references unknown parent {parent}",
                    org.id
                )));
            }
        }

        // Walk each parent chain; revisiting a node means a cycle.
        for org in &self.organizations {
            let mut seen = HashSet::from([org.id]);
            let mut cursor = org.parent_id;
            while let Some(id) = cursor {
                if !seen.insert(id) {
                    return Err(ConfigError::Config(format!(
                        "seed organization {} is part of a parent cycle",
                        org.id
                    )));
                }
                cursor = parents.get(&id).copied().flatten();
            }
        }

        let mut emails = HashSet::new();
        for user in &self.users {
            if !emails.insert(user.email.to_ascii_lowercase()) {
                return Err(ConfigError::Config(format!(
                    "duplicate seed user '{}'",
                    user.email
                )));
            }
            if !parents.contains_key(&user.organization_id) {
                return Err(ConfigError::Config(format!(
                    "seed user '{}' references unknown organization {}",
                    user.email, user.organization_id
                )));
            }
            if user.password.is_none() && user.password_env.is_none() {
                return Err(ConfigError::Config(format!(
                    "seed user '{}' needs password or password_env",
                    user.email
                )));
            }
        }

        for task in &self.tasks {
            if task.title.trim().is_empty() {
                return Err(ConfigError::Config("seed task with empty title".to_string()));
            }
            if !emails.contains(&task.owner.to_ascii_lowercase()) {
                return Err(ConfigError::Config(format!(
                    "seed task '{}' references unknown owner '{}'",
                    task.title, task.owner
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: i64, parent: Option<i64>) -> SeedOrganization {
        SeedOrganization {
            id: OrgId(id),
            name: format!("org-{id}"),
            parent_id: parent.map(OrgId),
        }
    }

    #[test]
    fn accepts_a_forest() {
        let seed = SeedConfig {
            organizations: vec![org(1, None), org(2, Some(1)), org(3, Some(2)), org(4, None)],
            ..Default::default()
        };
        seed.validate().unwrap();
        assert_eq!(seed.organization_records().len(), 4);
    }

    #[test]
    fn rejects_unknown_parent() {
        let seed = SeedConfig {
            organizations: vec![org(2, Some(1))],
            ..Default::default()
        };
        let err = seed.validate().unwrap_err();
        assert!(err.to_string().contains("unknown parent"));
    }

    #[test]
    fn rejects_parent_cycle() {
        let seed = SeedConfig {
            organizations: vec![org(1, Some(3)), org(2, Some(1)), org(3, Some(2))],
            ..Default::default()
        };
        let err = seed.validate().unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn rejects_task_with_unknown_owner() {
        let seed = SeedConfig {
            organizations: vec![org(1, None)],
            users: vec![SeedUser {
                email: "a@example.com".into(),
                password: Some("pw".into()),
                password_env: None,
                first_name: String::new(),
                last_name: String::new(),
                role: Role::Admin,
                organization_id: OrgId(1),
            }],
            tasks: vec![SeedTask {
                title: "t".into(),
                description: None,
                status: TaskStatus::Todo,
                priority: TaskPriority::Low,
                category: None,
                sort_order: 0,
                owner: "b@example.com".into(),
            }],
        };
        let err = seed.validate().unwrap_err();
        assert!(err.to_string().contains("unknown owner"));
    }
}
