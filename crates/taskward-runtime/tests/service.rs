//! TaskService flows over the in-memory repositories.
//!
//! Forest used throughout:
//!
//! ```text
//! 1 HQ
//! └── 2 Engineering
//!     └── 3 Platform
//! 4 Partner (separate tree)
//! ```

use pretty_assertions::assert_eq;
use std::sync::Arc;
use taskward_audit::{AuditAction, AuditFilter, AuditLogger};
use taskward_core::{
    NewTask, OrgId, Organization, Principal, Role, TaskFilter, TaskId, TaskPatch, TaskPriority,
    TaskStatus, UserId,
};
use taskward_runtime::{
    MemoryOrganizationRepository, MemoryTaskRepository, ServiceError, TaskService,
};

fn service() -> TaskService {
    let organizations = MemoryOrganizationRepository::with_organizations([
        Organization::new(OrgId(1), "HQ", None),
        Organization::new(OrgId(2), "Engineering", Some(OrgId(1))),
        Organization::new(OrgId(3), "Platform", Some(OrgId(2))),
        Organization::new(OrgId(4), "Partner", None),
    ]);
    TaskService::new(
        Arc::new(organizations),
        Arc::new(MemoryTaskRepository::new()),
        Arc::new(AuditLogger::in_memory()),
    )
}

fn owner_hq() -> Principal {
    Principal::new(UserId(1), Role::Owner, OrgId(1))
}

fn admin_eng() -> Principal {
    Principal::new(UserId(2), Role::Admin, OrgId(2))
}

fn admin_platform() -> Principal {
    Principal::new(UserId(5), Role::Admin, OrgId(3))
}

fn viewer_eng() -> Principal {
    Principal::new(UserId(3), Role::Viewer, OrgId(2))
}

fn owner_partner() -> Principal {
    Principal::new(UserId(4), Role::Owner, OrgId(4))
}

#[tokio::test]
async fn create_forces_principal_org_and_owner() {
    let service = service();
    let task = service
        .create(&admin_eng(), NewTask::titled("Plan sprint"))
        .await
        .unwrap();

    assert_eq!(task.organization_id, OrgId(2));
    assert_eq!(task.owner_user_id, UserId(2));
    assert_eq!(task.status, TaskStatus::Todo);
}

#[tokio::test]
async fn viewer_cannot_create() {
    let service = service();
    let err = service
        .create(&viewer_eng(), NewTask::titled("Sneaky"))
        .await
        .unwrap_err();
    assert!(err.is_denied());

    let denied = service
        .audit()
        .query(AuditFilter {
            action: Some(AuditAction::AuthorizationDenied),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].user_id, Some(UserId(3)));
}

#[tokio::test]
async fn empty_title_is_a_validation_error() {
    let service = service();
    let err = service
        .create(&admin_eng(), NewTask::titled("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn owner_lists_whole_subtree_admin_only_own_org() {
    let service = service();
    service.create(&owner_hq(), NewTask::titled("hq")).await.unwrap();
    service.create(&admin_eng(), NewTask::titled("eng")).await.unwrap();
    service.create(&admin_platform(), NewTask::titled("platform")).await.unwrap();
    service.create(&owner_partner(), NewTask::titled("partner")).await.unwrap();

    let mut owner_titles: Vec<String> = service
        .list(&owner_hq(), &TaskFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    owner_titles.sort();
    assert_eq!(owner_titles, vec!["eng", "hq", "platform"]);

    let admin_titles: Vec<String> = service
        .list(&admin_eng(), &TaskFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(admin_titles, vec!["eng"]);
}

#[tokio::test]
async fn list_applies_filters() {
    let service = service();
    service
        .create(
            &admin_eng(),
            NewTask {
                title: "urgent".into(),
                priority: Some(TaskPriority::High),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    service.create(&admin_eng(), NewTask::titled("routine")).await.unwrap();

    let filter = TaskFilter {
        priority: Some(TaskPriority::High),
        ..Default::default()
    };
    let tasks = service.list(&viewer_eng(), &filter).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "urgent");
}

#[tokio::test]
async fn missing_task_is_not_found_before_policy() {
    let service = service();
    // A stranger asking for a missing task still learns only "not found".
    let err = service.get(&owner_partner(), TaskId(999)).await.unwrap_err();
    assert!(err.is_not_found());

    let err = service
        .delete(&viewer_eng(), TaskId(999))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn owner_outside_subtree_is_denied() {
    let service = service();
    let task = service.create(&admin_eng(), NewTask::titled("eng")).await.unwrap();

    let err = service.get(&owner_partner(), task.id).await.unwrap_err();
    assert!(err.is_denied());
    assert!(service.get(&owner_hq(), task.id).await.is_ok());
}

#[tokio::test]
async fn child_admin_cannot_reach_parent_tasks() {
    let service = service();
    let task = service.create(&admin_eng(), NewTask::titled("eng")).await.unwrap();

    let err = service.get(&admin_platform(), task.id).await.unwrap_err();
    assert!(err.is_denied());
}

#[tokio::test]
async fn viewer_mutates_only_own_tasks() {
    let service = service();
    let admins = service.create(&admin_eng(), NewTask::titled("admin's")).await.unwrap();

    let patch = TaskPatch {
        status: Some(TaskStatus::Done),
        ..Default::default()
    };
    let err = service
        .update(&viewer_eng(), admins.id, patch.clone())
        .await
        .unwrap_err();
    assert!(err.is_denied());

    let err = service.delete(&viewer_eng(), admins.id).await.unwrap_err();
    assert!(err.is_denied());

    // Same org, elevated role: allowed.
    let updated = service.update(&admin_eng(), admins.id, patch).await.unwrap();
    assert_eq!(updated.status, TaskStatus::Done);
}

#[tokio::test]
async fn owner_updates_and_deletes_descendant_tasks() {
    let service = service();
    let task = service
        .create(&admin_platform(), NewTask::titled("deep"))
        .await
        .unwrap();

    let updated = service
        .update(
            &owner_hq(),
            task.id,
            TaskPatch {
                title: Some("deeper".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "deeper");
    assert_eq!(updated.organization_id, OrgId(3));

    service.delete(&owner_hq(), task.id).await.unwrap();
    assert!(service.get(&owner_hq(), task.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn every_operation_is_audited() {
    let service = service();
    let principal = admin_eng();
    let task = service.create(&principal, NewTask::titled("audit me")).await.unwrap();
    service.get(&principal, task.id).await.unwrap();
    service.list(&principal, &TaskFilter::default()).await.unwrap();
    service
        .update(
            &principal,
            task.id,
            TaskPatch {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    service.delete(&principal, task.id).await.unwrap();

    let events = service
        .audit()
        .query(AuditFilter::for_user(principal.user_id))
        .await
        .unwrap();
    let mut actions: Vec<AuditAction> = events.iter().map(|e| e.action).collect();
    actions.sort_by_key(|a| a.as_str());
    assert_eq!(
        actions,
        vec![
            AuditAction::CreateTask,
            AuditAction::DeleteTask,
            AuditAction::UpdateTask,
            AuditAction::ViewTask,
            AuditAction::ViewTasks,
        ]
    );

    let update = events
        .iter()
        .find(|e| e.action == AuditAction::UpdateTask)
        .unwrap();
    assert_eq!(update.details["changes"]["status"]["new"], "IN_PROGRESS");
    assert!(update.details["changes"].get("updatedAt").is_none());
}

#[tokio::test]
async fn accessible_organizations_reflect_role() {
    let service = service();
    assert_eq!(
        service.accessible_organizations(&owner_hq()).await.unwrap().to_sorted_vec(),
        vec![OrgId(1), OrgId(2), OrgId(3)]
    );
    assert_eq!(
        service.accessible_organizations(&viewer_eng()).await.unwrap().to_sorted_vec(),
        vec![OrgId(2)]
    );
    assert!(service.organization(OrgId(42)).await.unwrap_err().is_not_found());
}
