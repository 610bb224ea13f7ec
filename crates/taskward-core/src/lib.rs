//! Domain types shared across Taskward crates.
//!
//! Everything the access-control core reasons about lives here: identifiers,
//! the closed [`Role`] enumeration, [`Organization`] records that form the
//! tenant forest, the per-request [`Principal`], and [`Task`] records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Configuration types shared across all Taskward crates
pub mod config;
pub mod task;
pub mod user;

pub use config::{
    AuditConfig, BiscuitConfig, ConfigError, DatabaseBackend, DatabaseConfig,
    ObservabilityConfig, SeedConfig, SeedOrganization, SeedTask, SeedUser, ServerConfig,
    TaskwardConfig,
};
pub use task::{NewTask, Task, TaskFilter, TaskPatch, TaskPriority, TaskScope, TaskStatus};
pub use user::{User, UserProfile};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

id_type!(
    /// Organization identifier.
    OrgId
);
id_type!(
    /// User identifier.
    UserId
);
id_type!(
    /// Task identifier.
    TaskId
);

/// A value that did not match any variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// The three fixed roles.
///
/// The set is closed on purpose: an unrecognized role string fails to parse
/// and never reaches the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Admin,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Admin, Role::Viewer];

    /// Ordinal level used for hierarchy comparisons (Owner=3, Admin=2, Viewer=1).
    pub fn level(self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::Admin => 2,
            Role::Viewer => 1,
        }
    }

    /// True when this role is at or above `required`.
    pub fn has_level(self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Owner and Admin may create tasks and mutate any task they can see.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Admin => "Admin",
            Role::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("role", s))
    }
}

/// An organization node. `parent_org_id` links form a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    #[serde(default)]
    pub parent_org_id: Option<OrgId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(id: OrgId, name: impl Into<String>, parent_org_id: Option<OrgId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            parent_org_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_org_id.is_none()
    }
}

/// The authenticated actor of a single request.
///
/// Built from verified credentials and passed explicitly into every policy
/// decision; never stored in ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub organization_id: OrgId,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role, organization_id: OrgId) -> Self {
        Self {
            user_id,
            role,
            organization_id,
        }
    }
}
