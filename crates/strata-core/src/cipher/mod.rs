//! Artifact ciphers.
//!
//! Three on-disk formats exist, all readable and all writable:
//!
//! | Format    | Layers | Primitive              | Key domains              |
//! |-----------|--------|------------------------|--------------------------|
//! | `Legacy`  | 1      | AES-256-CBC            | legacy salt              |
//! | `Layered` | 2      | AES-256-CBC            | domain salt + wrapper    |
//! | `Sealed`  | 2      | AES-256-GCM + ChaCha20-Poly1305 | domain salt + wrapper |
//!
//! Only `Sealed` carries a header; CBC blobs are indistinguishable from random
//! bytes, so decoding them is trial decryption. A wrong CBC key still passes
//! the padding check now and then, so the CBC paths of [`decrypt_current`] and
//! [`decrypt_any`] only accept plaintext that parses as JSON.

pub mod layered;
pub mod legacy;
pub mod sealed;
pub mod single;

use std::fmt;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::Domain;
use crate::error::{Result, StrataError};

pub use layered::{decrypt_layered, encrypt_layered};
pub use legacy::{decrypt_legacy, encrypt_legacy};
pub use sealed::{decrypt_sealed, encrypt_sealed, is_sealed};
pub use single::{decrypt_once, encrypt_once};

/// On-disk artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// Single CBC layer with the historical salt
    Legacy,
    /// Two CBC layers
    Layered,
    /// Two AEAD layers
    #[default]
    Sealed,
}

impl ArtifactFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactFormat::Legacy => "legacy",
            ArtifactFormat::Layered => "layered",
            ArtifactFormat::Sealed => "sealed",
        }
    }

    /// True for formats without integrity protection.
    pub fn is_unauthenticated(self) -> bool {
        !matches!(self, ArtifactFormat::Sealed)
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactFormat {
    type Err = StrataError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ArtifactFormat::Legacy),
            "layered" => Ok(ArtifactFormat::Layered),
            "sealed" => Ok(ArtifactFormat::Sealed),
            other => Err(StrataError::InvalidInput(format!(
                "Unknown format: {} (expected legacy, layered or sealed)",
                other
            ))),
        }
    }
}

/// Encrypt `plaintext` for `domain` in the requested format.
pub fn encrypt_artifact(
    format: ArtifactFormat,
    passphrase: &str,
    domain: Domain,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    match format {
        ArtifactFormat::Legacy => encrypt_legacy(passphrase, plaintext),
        ArtifactFormat::Layered => encrypt_layered(passphrase, domain.salt(), plaintext),
        ArtifactFormat::Sealed => encrypt_sealed(passphrase, domain.salt(), plaintext),
    }
}

/// Reject CBC output that is not a JSON document.
fn require_json(plain: Vec<u8>, failure: StrataError) -> Result<Vec<u8>> {
    if serde_json::from_slice::<IgnoredAny>(&plain).is_ok() {
        return Ok(plain);
    }
    drop(Zeroizing::new(plain));
    Err(failure)
}

/// Decrypt with the current layered formats only (sealed, then layered CBC).
pub fn decrypt_current(
    passphrase: &str,
    domain: Domain,
    blob: &[u8],
) -> Result<(Vec<u8>, ArtifactFormat)> {
    if is_sealed(blob) {
        match decrypt_sealed(passphrase, domain.salt(), blob) {
            Ok(plain) => return Ok((plain, ArtifactFormat::Sealed)),
            Err(err) if err.is_decrypt_failure() => {
                debug!("sealed header present but sealed decrypt failed; trying layered");
            }
            Err(err) => return Err(err),
        }
    }
    let plain = decrypt_layered(passphrase, domain.salt(), blob)?;
    let plain = require_json(plain, StrataError::LayeredDecryptFailed)?;
    Ok((plain, ArtifactFormat::Layered))
}

/// Decrypt any supported format: sealed, layered, then legacy.
///
/// Returns the plaintext and the format that opened the blob.
pub fn decrypt_any(
    passphrase: &str,
    domain: Domain,
    blob: &[u8],
) -> Result<(Vec<u8>, ArtifactFormat)> {
    match decrypt_current(passphrase, domain, blob) {
        Ok(found) => Ok(found),
        Err(err) if err.is_decrypt_failure() => {
            debug!(domain = %domain, "layered decrypt failed; trying legacy format");
            let plain = decrypt_legacy(passphrase, blob)?;
            let plain = require_json(plain, StrataError::PaddingInvalid)?;
            Ok((plain, ArtifactFormat::Legacy))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASS: &str = "test-passphrase-secure-123";

    #[test]
    fn test_decrypt_any_reports_format() {
        for format in [
            ArtifactFormat::Legacy,
            ArtifactFormat::Layered,
            ArtifactFormat::Sealed,
        ] {
            let blob = encrypt_artifact(format, PASS, Domain::Local, br#"{"k":"v"}"#).unwrap();
            let (plain, found) = decrypt_any(PASS, Domain::Local, &blob).unwrap();
            assert_eq!(plain, br#"{"k":"v"}"#);
            assert_eq!(found, format);
        }
    }

    #[test]
    fn test_decrypt_current_skips_legacy() {
        let blob = encrypt_artifact(ArtifactFormat::Legacy, PASS, Domain::Local, b"{}").unwrap();
        assert!(matches!(
            decrypt_current(PASS, Domain::Local, &blob),
            Err(StrataError::LayeredDecryptFailed)
        ));
    }

    #[test]
    fn test_cbc_output_must_be_json() {
        let blob = encrypt_artifact(ArtifactFormat::Layered, PASS, Domain::Local, b"not json").unwrap();
        assert!(matches!(
            decrypt_current(PASS, Domain::Local, &blob),
            Err(StrataError::LayeredDecryptFailed)
        ));
        assert!(decrypt_any(PASS, Domain::Local, &blob).is_err());

        let blob = encrypt_artifact(ArtifactFormat::Legacy, PASS, Domain::Local, b"\x00\x01").unwrap();
        assert!(matches!(
            decrypt_any(PASS, Domain::Local, &blob),
            Err(StrataError::PaddingInvalid)
        ));
    }

    #[test]
    fn test_format_parse_and_default() {
        assert_eq!(ArtifactFormat::default(), ArtifactFormat::Sealed);
        assert_eq!("Layered".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Layered);
        assert!("v4".parse::<ArtifactFormat>().is_err());
        assert!(ArtifactFormat::Legacy.is_unauthenticated());
        assert!(!ArtifactFormat::Sealed.is_unauthenticated());
    }
}
