//! Key derivation.
//!
//! Two memory-hard derivations are provided, both keyed by a passphrase and a
//! fixed domain salt (see [`crate::domain`]):
//!
//! - **scrypt** for the CBC formats. Cost parameters are frozen because
//!   existing artifacts were written with them.
//! - **Argon2id** for the sealed (authenticated) format.

use argon2::Argon2;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, StrataError};

/// scrypt cost: N = 2^14, r = 8, p = 1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Argon2id parameters for the sealed format.
///
/// - Memory: 19 MiB (19 * 1024 KiB)
/// - Iterations: 2
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// Length of derived key in bytes (AES-256 / ChaCha20).
pub const KEY_LENGTH: usize = 32;

/// A symmetric key derived from a passphrase and a domain salt.
///
/// Key bytes are zeroized when the value is dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Raw key bytes. Never store or log them.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

fn ensure_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.is_empty() {
        return Err(StrataError::InvalidCredential(
            "Passphrase cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Derive a key with scrypt (CBC formats).
///
/// Same `(passphrase, salt)` always yields the same key; a different salt
/// yields an unrelated key.
///
/// # Examples
///
/// ```
/// use strata_core::crypto::derive_key;
///
/// let a = derive_key("hunter2", "local-v1").unwrap();
/// let b = derive_key("hunter2", "local-v1").unwrap();
/// assert_eq!(a.as_bytes(), b.as_bytes());
/// ```
pub fn derive_key(passphrase: &str, salt: &str) -> Result<DerivedKey> {
    ensure_passphrase(passphrase)?;

    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LENGTH)
        .map_err(|e| StrataError::Crypto(format!("Failed to create scrypt params: {}", e)))?;

    let mut key_bytes = [0u8; KEY_LENGTH];
    scrypt::scrypt(passphrase.as_bytes(), salt.as_bytes(), &params, &mut key_bytes)
        .map_err(|e| StrataError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey::from_bytes(key_bytes))
}

/// Derive a key with Argon2id (sealed format).
pub fn derive_sealed_key(passphrase: &str, salt: &str) -> Result<DerivedKey> {
    ensure_passphrase(passphrase)?;

    let params = argon2::Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(KEY_LENGTH),
    )
    .map_err(|e| StrataError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt.as_bytes(), &mut key_bytes)
        .map_err(|e| StrataError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey::from_bytes(key_bytes))
}
