use super::path;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::Path;
use axum::extract::rejection::PathRejection;
use axum::{Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use taskward_core::{OrgId, Organization, Principal, Role};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibleResponse {
    pub organization_id: OrgId,
    pub role: Role,
    /// Sorted ascending.
    pub accessible: Vec<OrgId>,
}

pub async fn list_organizations(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Organization>>, ApiError> {
    Ok(Json(state.service.organizations().await?))
}

pub async fn accessible_organizations(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AccessibleResponse>, ApiError> {
    let accessible = state.service.accessible_organizations(&principal).await?;
    Ok(Json(AccessibleResponse {
        organization_id: principal.organization_id,
        role: principal.role,
        accessible: accessible.to_sorted_vec(),
    }))
}

pub async fn get_organization(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Organization>, ApiError> {
    let id = OrgId(path(id)?);
    Ok(Json(state.service.organization(id).await?))
}
