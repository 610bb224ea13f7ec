//! Principal claims carried by a token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use taskward_core::{OrgId, Principal, Role, UserId};

/// Claims minted into a token's authority block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalClaims {
    pub user_id: UserId,
    pub role: Role,
    pub organization_id: OrgId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PrincipalClaims {
    /// Claims for `principal`, valid for `lifetime` from now.
    pub fn new(principal: &Principal, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: principal.user_id,
            role: principal.role,
            organization_id: principal.organization_id,
            issued_at: now,
            expires_at: now + lifetime,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.role, self.organization_id)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_lifetime() {
        let principal = Principal::new(UserId(1), Role::Owner, OrgId(1));
        let claims = PrincipalClaims::new(&principal, Duration::hours(1));
        assert!(!claims.is_expired());
        assert_eq!(claims.principal(), principal);

        let stale = PrincipalClaims::new(&principal, Duration::seconds(-5));
        assert!(stale.is_expired());
    }
}
