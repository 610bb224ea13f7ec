use super::json_body;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskward_biscuit::PrincipalClaims;
use taskward_core::{OrgId, Principal, Role, User, UserId, UserProfile};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: OrgId,
    pub role: Role,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let email = self.email.trim();
        let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
        if !well_formed {
            return Err(ApiError::BadRequest(format!("invalid email '{email}'")));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::BadRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "first and last name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub principal: Principal,
    pub user: Option<UserProfile>,
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = json_body(payload)?;
    let user = state.users.find_by_email(&request.email).await?;

    let Some(user) = user.filter(|u| verify_password(&request.password, &u.password_hash)) else {
        tracing::info!(email = %request.email, "Login failed");
        if let Err(e) = state.audit().log_login_failed(&request.email).await {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    let principal = user.principal();
    let access_token = state
        .tokens
        .mint(&PrincipalClaims::new(&principal, state.token_lifetime))?;

    tracing::info!(user = %user.id, role = %user.role, "Login succeeded");
    if let Err(e) = state.audit().log_login(&principal, &user.email).await {
        tracing::warn!(error = %e, "Failed to write audit event");
    }

    Ok(Json(LoginResponse {
        access_token,
        user: user.profile(),
    }))
}

/// Self-service signup. Returns the stored profile, never the hash.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    if !state.allow_registration {
        return Err(ApiError::Forbidden("Registration is disabled".into()));
    }
    let request = json_body(payload)?;
    request.validate()?;

    let email = request.email.trim().to_string();
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".into()));
    }
    let organizations = state.service.organizations().await?;
    if !organizations
        .iter()
        .any(|org| org.id == request.organization_id)
    {
        return Err(ApiError::BadRequest(format!(
            "organization {} does not exist",
            request.organization_id
        )));
    }

    let now = chrono::Utc::now();
    let password_hash =
        hash_password(&request.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    // A concurrent signup with the same email surfaces as a repository conflict.
    let user = state
        .users
        .create(User {
            id: UserId(0),
            email,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            password_hash,
            organization_id: request.organization_id,
            role: request.role,
            created_at: now,
            updated_at: now,
        })
        .await?;

    tracing::info!(user = %user.id, role = %user.role, org = %user.organization_id, "User registered");
    if let Err(e) = state.audit().log_user_created(user.id, &user.email).await {
        tracing::warn!(error = %e, "Failed to write audit event");
    }

    Ok((StatusCode::CREATED, Json(user.profile())))
}

pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state.users.get(principal.user_id).await?;
    Ok(Json(MeResponse {
        principal,
        user: user.map(|u| u.profile()),
    }))
}

/// Tokens are stateless; logout only leaves an audit record.
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> StatusCode {
    if let Err(e) = state.audit().log_logout(&principal).await {
        tracing::warn!(error = %e, "Failed to write audit event");
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            organization_id: OrgId(2),
            role: Role::Viewer,
        }
    }

    #[test]
    fn register_payload_validation() {
        assert!(request("ada@turbovets.com", "secret").validate().is_ok());

        for email in ["", "ada", "@turbovets.com", "ada@localhost", "ada@x@y.com", "ada@.com"] {
            assert!(
                matches!(request(email, "secret").validate(), Err(ApiError::BadRequest(_))),
                "{email} should be rejected"
            );
        }
        assert!(matches!(
            request("ada@turbovets.com", "short").validate(),
            Err(ApiError::BadRequest(_))
        ));

        let mut nameless = request("ada@turbovets.com", "secret");
        nameless.last_name = "  ".into();
        assert!(matches!(nameless.validate(), Err(ApiError::BadRequest(_))));
    }
}
