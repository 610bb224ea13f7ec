//! Keypair management for Biscuit tokens.

use crate::error::BiscuitError;
use biscuit_auth::{Algorithm, KeyPair as BiscuitKeyPair, PrivateKey, PublicKey};
use rand::RngCore;
use std::path::Path;
use taskward_core::BiscuitConfig;

/// File names written by [`KeyPair::save_to_dir`].
pub const PRIVATE_KEY_FILE: &str = "private.key";
pub const PUBLIC_KEY_FILE: &str = "public.key";

/// Where a resolved keypair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    File,
    /// Generated at startup; tokens die with the process.
    Ephemeral,
}

/// An Ed25519 keypair for signing and verifying Biscuit tokens.
pub struct KeyPair {
    inner: BiscuitKeyPair,
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_private_key(self.inner.private())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Result<Self, BiscuitError> {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);

        let private_key = PrivateKey::from_bytes(&bytes, Algorithm::Ed25519)
            .map_err(|e| BiscuitError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        Self {
            inner: BiscuitKeyPair::from(&private_key),
        }
    }

    /// Load a keypair from a hex-encoded private key string.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, BiscuitError> {
        let private_key = PrivateKey::from_bytes_hex(hex.trim(), Algorithm::Ed25519)
            .map_err(|e| BiscuitError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }

    /// Resolve the signing key from configuration.
    ///
    /// Environment variable first, then key file. With neither, a fresh
    /// keypair is generated and a warning is logged.
    pub fn resolve(config: &BiscuitConfig) -> Result<(Self, KeySource), BiscuitError> {
        if let Some(var) = &config.private_key_env
            && let Ok(hex) = std::env::var(var)
        {
            tracing::info!(env = %var, "Loaded token signing key from environment");
            return Ok((Self::from_private_key_hex(&hex)?, KeySource::Environment));
        }

        if let Some(path) = &config.private_key_file
            && path.exists()
        {
            tracing::info!(path = %path.display(), "Loaded token signing key from file");
            return Ok((Self::load_from_file(path)?, KeySource::File));
        }

        tracing::warn!(
            "No token signing key configured; using an ephemeral key. Issued tokens will not survive a restart."
        );
        Ok((Self::generate()?, KeySource::Ephemeral))
    }

    pub fn inner(&self) -> &BiscuitKeyPair {
        &self.inner
    }

    pub fn public_key(&self) -> PublicKey {
        self.inner.public()
    }

    pub fn private_key_hex(&self) -> String {
        self.inner.private().to_bytes_hex()
    }

    pub fn public_key_hex(&self) -> String {
        self.inner.public().to_bytes_hex()
    }

    /// Write `private.key` and `public.key` into `dir`, creating it.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), BiscuitError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(PRIVATE_KEY_FILE), self.private_key_hex())?;
        std::fs::write(dir.join(PUBLIC_KEY_FILE), self.public_key_hex())?;
        Ok(())
    }

    /// Load a keypair from a private key file.
    pub fn load_from_file(private_key_path: &Path) -> Result<Self, BiscuitError> {
        let hex = std::fs::read_to_string(private_key_path)?;
        Self::from_private_key_hex(&hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_keypair_roundtrip() {
        let keypair1 = KeyPair::generate().unwrap();
        let keypair2 = KeyPair::from_private_key_hex(&keypair1.private_key_hex()).unwrap();
        assert_eq!(keypair1.public_key_hex(), keypair2.public_key_hex());
        assert_eq!(keypair1.clone().public_key_hex(), keypair1.public_key_hex());
    }

    #[test]
    fn test_keypair_file_load() {
        let keypair = KeyPair::generate().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", keypair.private_key_hex()).unwrap();

        let loaded = KeyPair::load_from_file(file.path()).unwrap();
        assert_eq!(keypair.public_key_hex(), loaded.public_key_hex());
    }

    #[test]
    fn test_save_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = KeyPair::generate().unwrap();
        keypair.save_to_dir(&dir.path().join("keys")).unwrap();

        let public = std::fs::read_to_string(dir.path().join("keys").join(PUBLIC_KEY_FILE)).unwrap();
        assert_eq!(public, keypair.public_key_hex());
    }

    #[test]
    fn test_resolve_prefers_file_over_ephemeral() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = KeyPair::generate().unwrap();
        keypair.save_to_dir(dir.path()).unwrap();

        let config = BiscuitConfig {
            private_key_file: Some(dir.path().join(PRIVATE_KEY_FILE)),
            ..Default::default()
        };
        let (resolved, source) = KeyPair::resolve(&config).unwrap();
        assert_eq!(source, KeySource::File);
        assert_eq!(resolved.public_key_hex(), keypair.public_key_hex());

        let (_, source) = KeyPair::resolve(&BiscuitConfig::default()).unwrap();
        assert_eq!(source, KeySource::Ephemeral);
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        assert!(matches!(
            KeyPair::from_private_key_hex("zz"),
            Err(BiscuitError::InvalidPrivateKey(_))
        ));
    }
}
