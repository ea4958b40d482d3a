//! Decryption capabilities the loader can try in order.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::cipher::{decrypt_current, decrypt_legacy};
use crate::domain::Domain;
use crate::error::Result;

/// One way of turning an artifact into plaintext bytes.
///
/// Implementations must not write plaintext to disk. Any error means "this
/// capability could not open the artifact"; the loader moves on.
pub trait Decryptor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn decrypt(&self, artifact: &Path, passphrase: &SecretString, domain: Domain)
        -> Result<Vec<u8>>;
}

/// Sealed and layered CBC formats, decrypted in this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct InProcessDecryptor;

impl Decryptor for InProcessDecryptor {
    fn name(&self) -> &'static str {
        "in-process"
    }

    fn decrypt(
        &self,
        artifact: &Path,
        passphrase: &SecretString,
        domain: Domain,
    ) -> Result<Vec<u8>> {
        let blob = std::fs::read(artifact)?;
        let (plain, _format) = decrypt_current(passphrase.expose_secret(), domain, &blob)?;
        Ok(plain)
    }
}

/// The single-layer format that predates layering. Domain is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyDecryptor;

impl Decryptor for LegacyDecryptor {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn decrypt(
        &self,
        artifact: &Path,
        passphrase: &SecretString,
        _domain: Domain,
    ) -> Result<Vec<u8>> {
        let blob = std::fs::read(artifact)?;
        decrypt_legacy(passphrase.expose_secret(), &blob)
    }
}
