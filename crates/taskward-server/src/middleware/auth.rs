use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Axum middleware that resolves the caller's principal.
///
/// Verifies the bearer token (signature and expiry) and inserts the
/// resulting [`taskward_core::Principal`] into the request extensions.
/// Anything short of a valid token is a 401.
pub async fn require_principal(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("application state missing".into()))?;

    let token = extract_bearer(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

    let claims = state.verifier.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::Unauthorized("invalid or expired token".into())
    })?;

    req.extensions_mut().insert(claims.principal());
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
