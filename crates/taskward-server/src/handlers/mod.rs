//! HTTP handlers.
//!
//! Handlers stay thin: parse the request, call [`taskward_runtime::TaskService`]
//! with the principal the auth middleware resolved, and map the outcome.

pub mod audit;
pub mod auth;
pub mod organizations;
pub mod tasks;

use crate::error::ApiError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use serde_json::json;

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "taskward" }))
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub(crate) fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub(crate) fn path<T>(segment: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    segment
        .map(|Path(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}
