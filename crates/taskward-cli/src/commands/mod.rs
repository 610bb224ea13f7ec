//! CLI command implementations.

pub mod keys;
pub mod orgs;
pub mod serve;
pub mod token;
