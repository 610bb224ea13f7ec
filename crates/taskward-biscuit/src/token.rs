//! Token creation and verification.

use crate::claims::PrincipalClaims;
use crate::error::BiscuitError;
use crate::keys::KeyPair;
use biscuit_auth::builder::AuthorizerBuilder;
use biscuit_auth::macros::{check, fact};
use biscuit_auth::{Authorizer, Biscuit, PublicKey};
use chrono::{DateTime, Utc};
use taskward_core::{OrgId, Role, UserId};

/// Mints principal tokens.
pub struct TokenBuilder {
    keypair: KeyPair,
}

impl TokenBuilder {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Mint a token carrying `claims`, expiring at `claims.expires_at`.
    pub fn mint(&self, claims: &PrincipalClaims) -> Result<String, BiscuitError> {
        let expires_at = claims.expires_at.timestamp();

        let biscuit = Biscuit::builder()
            .fact(fact!("user({id})", id = claims.user_id.get()))
            .and_then(|b| b.fact(fact!("role({role})", role = claims.role.as_str().to_string())))
            .and_then(|b| b.fact(fact!("organization({org})", org = claims.organization_id.get())))
            .and_then(|b| b.fact(fact!("issued_at({ts})", ts = claims.issued_at.timestamp())))
            .and_then(|b| b.fact(fact!("expires_at({ts})", ts = expires_at)))
            .and_then(|b| {
                b.check(check!(
                    "check if time($time), $time < {expires_at}",
                    expires_at = expires_at
                ))
            })
            .map_err(|e| BiscuitError::TokenCreationFailed(e.to_string()))?
            .build(self.keypair.inner())
            .map_err(|e| BiscuitError::TokenCreationFailed(e.to_string()))?;

        tracing::debug!(
            user = %claims.user_id,
            role = %claims.role,
            org = %claims.organization_id,
            expires_at = %claims.expires_at,
            "Minted principal token"
        );

        biscuit
            .to_base64()
            .map_err(|e| BiscuitError::SerializationError(e.to_string()))
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }
}

/// Verifies principal tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    public_key: PublicKey,
}

impl TokenVerifier {
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }

    /// Verify signature and expiry, then extract the claims.
    pub fn verify(&self, token: &str) -> Result<PrincipalClaims, BiscuitError> {
        let biscuit = Biscuit::from_base64(token.trim(), self.public_key.clone())
            .map_err(|e| BiscuitError::TokenParseFailed(e.to_string()))?;

        let now = Utc::now().timestamp();
        let mut authorizer = AuthorizerBuilder::new()
            .code(format!(
                r#"
                time({now});
                allow if true;
                "#
            ))
            .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?
            .build(&biscuit)
            .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?;

        authorizer
            .authorize()
            .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?;

        let user_id = UserId(int_fact(&mut authorizer, "user")?);
        let organization_id = OrgId(int_fact(&mut authorizer, "organization")?);
        let role_name = string_fact(&mut authorizer, "role")?;
        let role: Role = role_name.parse().map_err(|e: taskward_core::UnknownVariant| {
            BiscuitError::InvalidClaim {
                claim: "role".to_string(),
                reason: e.to_string(),
            }
        })?;
        let issued_at = timestamp(int_fact(&mut authorizer, "issued_at")?, "issued_at")?;
        let expires_at = timestamp(int_fact(&mut authorizer, "expires_at")?, "expires_at")?;

        Ok(PrincipalClaims {
            user_id,
            role,
            organization_id,
            issued_at,
            expires_at,
        })
    }
}

fn query_rule(name: &str) -> Result<biscuit_auth::builder::Rule, BiscuitError> {
    format!("data($x) <- {name}($x)")
        .parse()
        .map_err(|e: biscuit_auth::error::Token| BiscuitError::VerificationFailed(e.to_string()))
}

fn string_fact(authorizer: &mut Authorizer, name: &str) -> Result<String, BiscuitError> {
    let results: Vec<(String,)> = authorizer
        .query(query_rule(name)?)
        .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?;

    results
        .into_iter()
        .next()
        .map(|(s,)| s)
        .ok_or_else(|| BiscuitError::MissingClaim {
            claim: name.to_string(),
        })
}

fn int_fact(authorizer: &mut Authorizer, name: &str) -> Result<i64, BiscuitError> {
    let results: Vec<(i64,)> = authorizer
        .query(query_rule(name)?)
        .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?;

    results
        .into_iter()
        .next()
        .map(|(v,)| v)
        .ok_or_else(|| BiscuitError::MissingClaim {
            claim: name.to_string(),
        })
}

fn timestamp(seconds: i64, claim: &str) -> Result<DateTime<Utc>, BiscuitError> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| BiscuitError::InvalidClaim {
        claim: claim.to_string(),
        reason: format!("{seconds} is not a valid timestamp"),
    })
}
