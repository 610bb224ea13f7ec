//! # taskward-biscuit
//!
//! Bearer tokens for Taskward.
//!
//! A token is a Biscuit signed with the server's Ed25519 key. Its authority
//! block carries the principal as facts:
//!
//! ```text
//! user(7);
//! role("Admin");
//! organization(2);
//! issued_at(1700000000);
//! expires_at(1700086400);
//! check if time($time), $time < 1700086400;
//! ```
//!
//! [`TokenVerifier::verify`] checks the signature, runs the expiry check
//! against the current time and rebuilds the [`taskward_core::Principal`].
//! A token whose `role` fact is not one of the three known roles is
//! rejected.

pub mod claims;
pub mod error;
pub mod keys;
pub mod token;

pub use biscuit_auth::PublicKey;
pub use claims::PrincipalClaims;
pub use error::BiscuitError;
pub use keys::{KeyPair, KeySource};
pub use token::{TokenBuilder, TokenVerifier};
