//! Policy scenarios over small organization forests.

use chrono::Utc;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use taskward_core::{NewTask, OrgId, Organization, Principal, Role, TaskId, TaskScope, UserId};
use taskward_policy::{
    AccessErrorKind, TaskPolicy, accessible_org_ids, can_create, can_mutate, can_read,
    descendants,
};

fn chain() -> Vec<Organization> {
    vec![
        Organization::new(OrgId(1), "root", None),
        Organization::new(OrgId(2), "child", Some(OrgId(1))),
        Organization::new(OrgId(3), "grandchild", Some(OrgId(2))),
    ]
}

fn set(ids: &[i64]) -> HashSet<OrgId> {
    ids.iter().copied().map(OrgId).collect()
}

#[test]
fn owner_reaches_whole_subtree() {
    let orgs = chain();
    assert_eq!(
        accessible_org_ids(OrgId(1), Role::Owner, &orgs).into_set(),
        set(&[1, 2, 3])
    );
}

#[test]
fn admin_stays_in_own_org() {
    let orgs = chain();
    assert_eq!(
        accessible_org_ids(OrgId(1), Role::Admin, &orgs).into_set(),
        set(&[1])
    );
}

#[test]
fn admin_and_viewer_resolve_identically() {
    let orgs = chain();
    for org in [1, 2, 3, 42] {
        let admin = accessible_org_ids(OrgId(org), Role::Admin, &orgs);
        let viewer = accessible_org_ids(OrgId(org), Role::Viewer, &orgs);
        assert_eq!(admin, viewer);
        assert_eq!(admin.into_set(), set(&[org]));
    }
}

#[test]
fn owner_set_is_self_plus_descendants() {
    let orgs = chain();
    for org in [1, 2, 3] {
        let mut expected = descendants(OrgId(org), &orgs);
        expected.insert(OrgId(org));
        assert_eq!(
            accessible_org_ids(OrgId(org), Role::Owner, &orgs).into_set(),
            expected
        );
    }
}

#[test]
fn resolution_is_idempotent() {
    let orgs = chain();
    let first = accessible_org_ids(OrgId(2), Role::Owner, &orgs);
    let second = accessible_org_ids(OrgId(2), Role::Owner, &orgs);
    assert_eq!(first, second);
}

#[test]
fn leaf_owner_sees_only_itself() {
    let orgs = chain();
    assert_eq!(
        accessible_org_ids(OrgId(3), Role::Owner, &orgs).into_set(),
        set(&[3])
    );
}

#[test]
fn unknown_org_yields_itself() {
    let orgs = chain();
    assert_eq!(
        accessible_org_ids(OrgId(99), Role::Owner, &orgs).into_set(),
        set(&[99])
    );
    assert_eq!(
        accessible_org_ids(OrgId(99), Role::Owner, &[]).into_set(),
        set(&[99])
    );
}

#[test]
fn cyclic_snapshot_terminates() {
    let orgs = vec![
        Organization::new(OrgId(1), "a", Some(OrgId(2))),
        Organization::new(OrgId(2), "b", Some(OrgId(1))),
    ];
    assert_eq!(
        accessible_org_ids(OrgId(1), Role::Owner, &orgs).into_set(),
        set(&[1, 2])
    );
}

#[test]
fn task_owner_may_mutate_without_elevated_role() {
    let orgs = chain();
    let task = TaskScope::new(UserId(5), OrgId(2));

    let owner_viewer = Principal::new(UserId(5), Role::Viewer, OrgId(2));
    let accessible = accessible_org_ids(OrgId(2), Role::Viewer, &orgs);
    assert!(can_mutate(&task, &owner_viewer, &accessible));

    let other_viewer = Principal::new(UserId(9), Role::Viewer, OrgId(2));
    assert!(!can_mutate(&task, &other_viewer, &accessible));
}

#[test]
fn owner_reads_grandchild_task_admin_does_not() {
    let orgs = chain();
    let task = TaskScope::new(UserId(7), OrgId(3));

    assert!(can_read(&task, &accessible_org_ids(OrgId(1), Role::Owner, &orgs)));
    assert!(!can_read(&task, &accessible_org_ids(OrgId(1), Role::Admin, &orgs)));
}

#[test]
fn create_is_elevated_only_and_forces_home_org() {
    assert!(!can_create(Role::Viewer));
    assert!(can_create(Role::Admin));
    assert!(can_create(Role::Owner));

    let admin = Principal::new(UserId(4), Role::Admin, OrgId(2));
    let task = NewTask::titled("Quarterly review").into_task(TaskId(1), &admin, Utc::now());
    assert_eq!(task.organization_id, OrgId(2));
    assert_eq!(task.owner_user_id, UserId(4));
}

#[test]
fn policy_errors_carry_denied_kind() {
    let orgs = chain();
    let admin = TaskPolicy::resolve(Principal::new(UserId(4), Role::Admin, OrgId(1)), &orgs);
    let err = admin
        .authorize_read(&TaskScope::new(UserId(4), OrgId(3)))
        .unwrap_err();
    assert_eq!(err.kind, AccessErrorKind::AuthorizationDenied);
}
