//! Key management commands.
//!
//! `taskward keys generate` - Generate a new Biscuit keypair.

use std::path::PathBuf;
use taskward_biscuit::KeyPair;
use taskward_biscuit::keys::{PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};

/// Generate a new Biscuit keypair.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = KeyPair::generate()?;

    if let Some(output_dir) = output {
        keypair.save_to_dir(&output_dir)?;

        println!("✔ Generated Biscuit keypair:");
        println!("  Private key: {}", output_dir.join(PRIVATE_KEY_FILE).display());
        println!("  Public key:  {}", output_dir.join(PUBLIC_KEY_FILE).display());
        println!();
        println!("⚠️  Keep your private key secure! Never commit it to version control.");
        println!();
        println!("Point the server at it in taskward.yaml:");
        println!("  biscuit:");
        println!(
            "    private_key_file: {}",
            output_dir.join(PRIVATE_KEY_FILE).display()
        );
    } else {
        println!("Private key (keep secure!):");
        println!("{}", keypair.private_key_hex());
        println!();
        println!("Public key:");
        println!("{}", keypair.public_key_hex());
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_generate_keys_to_files() {
        let dir = tempdir().unwrap();
        generate(Some(dir.path().join("keys"))).unwrap();

        let private_hex = fs::read_to_string(dir.path().join("keys").join(PRIVATE_KEY_FILE)).unwrap();
        let public_hex = fs::read_to_string(dir.path().join("keys").join(PUBLIC_KEY_FILE)).unwrap();

        // 32-byte Ed25519 keys, hex encoded.
        assert_eq!(private_hex.len(), 64);
        assert_eq!(public_hex.len(), 64);
        assert!(KeyPair::from_private_key_hex(&private_hex).is_ok());
    }
}
