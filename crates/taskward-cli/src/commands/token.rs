//! Token commands.
//!
//! `taskward token mint` - Mint a principal token for manual API calls.

use anyhow::Context;
use std::path::Path;
use taskward_biscuit::{KeyPair, PrincipalClaims, TokenBuilder};
use taskward_core::{OrgId, Principal, Role, UserId};

/// Parse a lifetime such as "24h", "30m" or "7d".
fn parse_ttl(ttl: &str) -> anyhow::Result<chrono::Duration> {
    let std = humantime::parse_duration(ttl.trim())
        .with_context(|| format!("Invalid --ttl '{ttl}'. Expected e.g. 24h, 30m, 7d"))?;
    Ok(chrono::Duration::from_std(std)?)
}

/// Mint a token for the given principal.
pub fn mint(
    user_id: i64,
    role: Role,
    org_id: i64,
    ttl: &str,
    private_key_file: &Path,
) -> anyhow::Result<String> {
    let keypair = KeyPair::load_from_file(private_key_file).with_context(|| {
        format!(
            "Failed to load private key from file: {}",
            private_key_file.display()
        )
    })?;

    let principal = Principal::new(UserId(user_id), role, OrgId(org_id));
    let claims = PrincipalClaims::new(&principal, parse_ttl(ttl)?);
    let token = TokenBuilder::new(keypair).mint(&claims)?;

    tracing::debug!(expires_at = %claims.expires_at, "Minted token");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskward_biscuit::TokenVerifier;
    use tempfile::tempdir;

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl("24h").unwrap(), chrono::Duration::hours(24));
        assert_eq!(parse_ttl("30m").unwrap(), chrono::Duration::minutes(30));
        assert_eq!(parse_ttl("7d").unwrap(), chrono::Duration::days(7));
        assert!(parse_ttl("soon").is_err());
    }

    #[test]
    fn test_mint_with_key_file() {
        let dir = tempdir().unwrap();
        let keypair = KeyPair::generate().unwrap();
        keypair.save_to_dir(dir.path()).unwrap();

        let token = mint(
            7,
            Role::Viewer,
            2,
            "1h",
            &dir.path().join(taskward_biscuit::keys::PRIVATE_KEY_FILE),
        )
        .unwrap();

        let claims = TokenVerifier::new(keypair.public_key()).verify(&token).unwrap();
        assert_eq!(claims.principal(), Principal::new(UserId(7), Role::Viewer, OrgId(2)));
    }

    #[test]
    fn test_missing_key_file() {
        let dir = tempdir().unwrap();
        assert!(mint(1, Role::Owner, 1, "1h", &dir.path().join("absent.key")).is_err());
    }
}
