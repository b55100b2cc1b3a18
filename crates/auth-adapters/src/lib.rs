//! # auth-adapters
//!
//! Identity and hashing implementations of the `domains` ports:
//! trusted-header identity, SHA-256 post passwords and Argon2 placeholder
//! account credentials.

mod hashing;
mod trusted_header;

pub use hashing::Sha256CredentialHasher;
pub use trusted_header::TrustedHeaderIdentity;
