use super::{json_body, path, query};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::{Extension, Json, http::StatusCode};
use std::sync::Arc;
use taskward_core::{NewTask, Principal, Task, TaskFilter, TaskId, TaskPatch};

pub async fn list_tasks(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    params: Result<Query<TaskFilter>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let filter = query(params)?;
    Ok(Json(state.service.list(&principal, &filter).await?))
}

pub async fn create_task(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let new_task = json_body(payload)?;
    let task = state.service.create(&principal, new_task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = TaskId(path(id)?);
    Ok(Json(state.service.get(&principal, id).await?))
}

pub async fn update_task(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = TaskId(path(id)?);
    let patch = json_body(payload)?;
    Ok(Json(state.service.update(&principal, id, patch).await?))
}

pub async fn delete_task(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = TaskId(path(id)?);
    state.service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
