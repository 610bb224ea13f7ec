use super::query;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::{Extension, Json};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use taskward_audit::{AuditAction, AuditEvent, AuditFilter};
use taskward_core::{Principal, Role, UserId};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (start of day).
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (end of day).
    pub end_date: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AuditLogQuery {
    fn into_filter(self) -> Result<AuditFilter, ApiError> {
        let action = self
            .action
            .as_deref()
            .map(str::parse::<AuditAction>)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(AuditFilter {
            user_id: self.user_id.map(UserId),
            action,
            start_time: self
                .start_date
                .as_deref()
                .map(|s| parse_bound(s, NaiveTime::MIN))
                .transpose()?,
            end_time: self
                .end_date
                .as_deref()
                .map(|s| parse_bound(s, end_of_day()))
                .transpose()?,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn parse_bound(value: &str, day_time: NaiveTime) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(day_time).and_utc())
        .map_err(|_| ApiError::BadRequest(format!("invalid date '{value}'")))
}

/// Audit events visible to Owners and Admins, newest first.
pub async fn audit_log(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    params: Result<Query<AuditLogQuery>, QueryRejection>,
) -> Result<Json<Vec<AuditEvent>>, ApiError> {
    let policy = state.service.policy_for(&principal).await?;
    if let Err(denied) = policy.require_role(Role::Admin) {
        tracing::warn!(user = %principal.user_id, role = %principal.role, "Audit log denied");
        if let Err(e) = state
            .audit()
            .log_authorization_denied(&principal, "VIEW_AUDIT_LOG", None, &denied.message)
            .await
        {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
        return Err(denied.into());
    }

    let filter = query(params)?.into_filter()?;
    Ok(Json(state.audit().query(filter).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_bounds_cover_the_whole_day() {
        let start = parse_bound("2025-03-01", NaiveTime::MIN).unwrap();
        let end = parse_bound("2025-03-01", end_of_day()).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert_eq!((end - start).num_seconds(), 86_399);
    }

    #[test]
    fn rfc3339_bounds_are_normalized_to_utc() {
        let at = parse_bound("2025-03-01T10:00:00+02:00", NaiveTime::MIN).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-03-01T08:00:00+00:00");
        assert!(parse_bound("yesterday", NaiveTime::MIN).is_err());
    }

    #[test]
    fn unknown_action_is_a_bad_request() {
        let query = AuditLogQuery {
            action: Some("TELEPORT".into()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(ApiError::BadRequest(_))));
    }
}
