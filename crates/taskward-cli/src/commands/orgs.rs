//! Organization commands.
//!
//! `taskward orgs accessible` - Show which organizations a role can reach
//! from a home organization, using the configured seed hierarchy.

use serde::Serialize;
use std::path::Path;
use taskward_core::{OrgId, Role, TaskwardConfig};
use taskward_policy::accessible_org_ids;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessibleReport {
    pub organization_id: OrgId,
    pub role: Role,
    pub accessible: Vec<OrgId>,
}

pub fn accessible(config: Option<&Path>, org_id: i64, role: Role) -> anyhow::Result<AccessibleReport> {
    let config = TaskwardConfig::load(config)?;
    let organizations = config.seed.organization_records();
    if organizations.is_empty() {
        tracing::warn!("Configuration has no seed organizations; only the home organization is reachable");
    }

    let org = OrgId(org_id);
    Ok(AccessibleReport {
        organization_id: org,
        role,
        accessible: accessible_org_ids(org, role, &organizations).to_sorted_vec(),
    })
}
