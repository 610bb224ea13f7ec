//! Organization hierarchy resolution.
//!
//! Organizations form a forest through `parent_org_id`. Resolution builds a
//! parent-to-children index over a snapshot and walks it iteratively. The
//! walk keeps a visited set, so a malformed snapshot containing a cycle still
//! terminates; no error is raised for it.

use std::collections::{HashMap, HashSet};
use taskward_core::{OrgId, Organization, Principal, Role};

/// The set of organization ids a principal may act upon.
///
/// Always contains the principal's own organization. Membership is the only
/// meaningful query; iteration order is unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibleOrgs {
    home: OrgId,
    ids: HashSet<OrgId>,
}

impl AccessibleOrgs {
    /// The singleton set `{home}`.
    pub fn only(home: OrgId) -> Self {
        Self {
            home,
            ids: HashSet::from([home]),
        }
    }

    pub fn home(&self) -> OrgId {
        self.home
    }

    pub fn contains(&self, org: OrgId) -> bool {
        self.ids.contains(&org)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = OrgId> + '_ {
        self.ids.iter().copied()
    }

    /// Ids in ascending order, for stable output and query binding.
    pub fn to_sorted_vec(&self) -> Vec<OrgId> {
        let mut ids: Vec<OrgId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn as_set(&self) -> &HashSet<OrgId> {
        &self.ids
    }

    pub fn into_set(self) -> HashSet<OrgId> {
        self.ids
    }
}

/// Parent-to-children adjacency over one organization snapshot.
///
/// Build once per snapshot and reuse it for any number of resolutions.
#[derive(Debug, Clone, Default)]
pub struct OrgIndex {
    children: HashMap<OrgId, Vec<OrgId>>,
}

impl OrgIndex {
    pub fn new(organizations: &[Organization]) -> Self {
        let mut children: HashMap<OrgId, Vec<OrgId>> = HashMap::new();
        for org in organizations {
            if let Some(parent) = org.parent_org_id {
                children.entry(parent).or_default().push(org.id);
            }
        }
        Self { children }
    }

    /// Direct children of `org`.
    pub fn children(&self, org: OrgId) -> &[OrgId] {
        self.children.get(&org).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every organization below `root` at any depth, excluding `root`.
    pub fn descendants(&self, root: OrgId) -> HashSet<OrgId> {
        let mut visited = HashSet::from([root]);
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            for &child in self.children(current) {
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }
        visited.remove(&root);
        visited
    }

    /// Resolve the accessible set for a principal at `org` with `role`.
    pub fn accessible(&self, org: OrgId, role: Role) -> AccessibleOrgs {
        let mut accessible = AccessibleOrgs::only(org);
        if role == Role::Owner {
            accessible.ids.extend(self.descendants(org));
        }
        tracing::debug!(
            org = %org,
            role = %role,
            accessible = accessible.len(),
            "Resolved accessible organizations"
        );
        accessible
    }
}

/// Organizations a principal at `org` with `role` may act upon.
///
/// Owner: `org` plus all descendants. Admin and Viewer: exactly `{org}`.
/// An `org` missing from the snapshot still yields `{org}`.
pub fn accessible_org_ids(org: OrgId, role: Role, organizations: &[Organization]) -> AccessibleOrgs {
    if role != Role::Owner {
        return AccessibleOrgs::only(org);
    }
    OrgIndex::new(organizations).accessible(org, role)
}

/// All organizations below `org` at any depth.
pub fn descendants(org: OrgId, organizations: &[Organization]) -> HashSet<OrgId> {
    OrgIndex::new(organizations).descendants(org)
}

/// Whether `principal` may act on organization `target`.
pub fn can_access_organization(
    principal: &Principal,
    target: OrgId,
    organizations: &[Organization],
) -> bool {
    target == principal.organization_id
        || accessible_org_ids(principal.organization_id, principal.role, organizations)
            .contains(target)
}
