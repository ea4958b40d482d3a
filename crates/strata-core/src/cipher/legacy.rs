//! Legacy single-layer format.
//!
//! One CBC layer keyed by `derive(p, LEGACY_SALT)`, independent of domain.
//! Kept so artifacts written before layering stay decryptable.

use crate::cipher::single::{decrypt_once, encrypt_once};
use crate::crypto::derive_key;
use crate::domain::LEGACY_SALT;
use crate::error::Result;

pub fn encrypt_legacy(passphrase: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_once(&derive_key(passphrase, LEGACY_SALT)?, plaintext)
}

pub fn decrypt_legacy(passphrase: &str, blob: &[u8]) -> Result<Vec<u8>> {
    decrypt_once(&derive_key(passphrase, LEGACY_SALT)?, blob)
}
