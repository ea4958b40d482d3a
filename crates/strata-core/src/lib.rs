//! # Strata Core
//!
//! Layered at-rest encryption for structured configuration files.
//!
//! This crate owns the cryptography, artifact layout and read path, and is
//! independent of the `strata` command-line interface.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation (scrypt, Argon2id) and passphrase policy
//! - **domain**: key domains and their fixed salts
//! - **cipher**: single-layer, layered, sealed and legacy artifact formats
//! - **artifact**: logical files and their on-disk paths
//! - **targets**: local vs. distribution artifact production
//! - **loader**: the consumer read path with its fallback chain and cache
//! - **maintenance**: format migration and at-rest verification

pub mod artifact;
pub mod cipher;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod fs;
pub mod loader;
pub mod maintenance;
pub mod targets;

pub use artifact::{ArtifactState, DataDir, LogicalFile, DEFAULT_FILES};
pub use cipher::{decrypt_any, decrypt_current, encrypt_artifact, ArtifactFormat};
pub use domain::Domain;
pub use error::{Result, StrataError};
pub use loader::{LoaderConfig, SecureLoader};
pub use maintenance::{re_encrypt, verify, ReEncryptReport, VerifyReport};
pub use targets::DualTarget;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_loader_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SecureLoader>();
    }
}
