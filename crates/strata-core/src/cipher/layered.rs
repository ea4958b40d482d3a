//! Two-layer CBC composition.
//!
//! ```text
//! inner = encrypt_once(derive(p, domain_salt), plaintext)
//! blob  = encrypt_once(derive(p + "-outer", WRAPPER_SALT), inner)
//! ```
//!
//! Decryption reverses the order. A failure in either layer is reported as
//! `LayeredDecryptFailed` so callers can move on to the next fallback.
//!
//! Neither layer is authenticated. Both domains share the wrapper key, so a
//! blob from another domain always opens its outer layer, and the inner
//! PKCS#7 check then passes by chance roughly once in 256 attempts. The
//! result is garbage, never the original plaintext; `decrypt_current` and
//! `decrypt_any` reject it because it is not JSON.

use zeroize::Zeroizing;

use crate::cipher::single::{decrypt_once, encrypt_once};
use crate::crypto::{derive_key, DerivedKey};
use crate::domain::{OUTER_PASSPHRASE_SUFFIX, WRAPPER_SALT};
use crate::error::{Result, StrataError};

pub(crate) fn outer_passphrase(passphrase: &str) -> Zeroizing<String> {
    Zeroizing::new(format!("{}{}", passphrase, OUTER_PASSPHRASE_SUFFIX))
}

fn outer_key(passphrase: &str) -> Result<DerivedKey> {
    derive_key(&outer_passphrase(passphrase), WRAPPER_SALT)
}

fn layer_failure(err: StrataError) -> StrataError {
    if err.is_decrypt_failure() {
        StrataError::LayeredDecryptFailed
    } else {
        err
    }
}

/// Encrypt `plaintext` as a layered blob (inner domain layer, then wrapper layer).
///
/// # Examples
///
/// ```
/// use strata_core::cipher::layered::{decrypt_layered, encrypt_layered};
///
/// let blob = encrypt_layered("hunter2", "local-v1", br#"{"a":1}"#).unwrap();
/// let plain = decrypt_layered("hunter2", "local-v1", &blob).unwrap();
/// assert_eq!(plain, br#"{"a":1}"#);
/// ```
pub fn encrypt_layered(passphrase: &str, domain_salt: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let inner_key = derive_key(passphrase, domain_salt)?;
    let inner = Zeroizing::new(encrypt_once(&inner_key, plaintext)?);
    encrypt_once(&outer_key(passphrase)?, &inner)
}

/// Decrypt a layered blob: wrapper layer first, then the domain layer.
///
/// # Errors
///
/// - `LayeredDecryptFailed` if either layer fails (wrong passphrase, wrong
///   domain, truncated or corrupted blob)
/// - `InvalidCredential` for an empty passphrase
///
/// A wrong domain salt is not always detected here; see the module docs.
pub fn decrypt_layered(passphrase: &str, domain_salt: &str, blob: &[u8]) -> Result<Vec<u8>> {
    let inner = Zeroizing::new(decrypt_once(&outer_key(passphrase)?, blob).map_err(layer_failure)?);
    let inner_key = derive_key(passphrase, domain_salt)?;
    decrypt_once(&inner_key, &inner).map_err(layer_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::single::{BLOCK_SIZE, IV_LENGTH};
    use crate::domain::{DISTRIBUTION_SALT, LOCAL_SALT};

    #[test]
    fn test_concrete_scenario() {
        let blob = encrypt_layered("hunter2", "local-v1", br#"{"a":1}"#).unwrap();

        let plain = decrypt_layered("hunter2", "local-v1", &blob).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&plain).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));

        let result = decrypt_layered("hunter3", "local-v1", &blob);
        assert!(matches!(result, Err(StrataError::LayeredDecryptFailed)));
    }

    #[test]
    fn test_ciphertext_differs_plaintext_does_not() {
        let x = b"identical plaintext";
        let a = encrypt_layered("test-passphrase", LOCAL_SALT, x).unwrap();
        let b = encrypt_layered("test-passphrase", LOCAL_SALT, x).unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt_layered("test-passphrase", LOCAL_SALT, &a).unwrap(), x);
        assert_eq!(decrypt_layered("test-passphrase", LOCAL_SALT, &b).unwrap(), x);
    }

    #[test]
    fn test_domain_isolation() {
        let plaintext = br#"{"persona":"x"}"#;
        let outer = outer_key("test-passphrase").unwrap();
        let dist = derive_key("test-passphrase", DISTRIBUTION_SALT).unwrap();
        let local = derive_key("test-passphrase", LOCAL_SALT).unwrap();

        // Find an inner layer whose padding happens to check out under the
        // local key, and one that does not.
        let mut lucky = None;
        let mut rejected = None;
        for _ in 0..100_000 {
            let inner = encrypt_once(&dist, plaintext).unwrap();
            match decrypt_once(&local, &inner) {
                Ok(_) if lucky.is_none() => lucky = Some(inner),
                Err(_) if rejected.is_none() => rejected = Some(inner),
                _ => {}
            }
            if lucky.is_some() && rejected.is_some() {
                break;
            }
        }

        let rejected = encrypt_once(&outer, &rejected.unwrap()).unwrap();
        assert!(matches!(
            decrypt_layered("test-passphrase", LOCAL_SALT, &rejected),
            Err(StrataError::LayeredDecryptFailed)
        ));

        let lucky = encrypt_once(&outer, &lucky.unwrap()).unwrap();
        let garbage = decrypt_layered("test-passphrase", LOCAL_SALT, &lucky).unwrap();
        assert_ne!(garbage, plaintext);
        assert!(matches!(
            crate::cipher::decrypt_current("test-passphrase", crate::domain::Domain::Local, &lucky),
            Err(StrataError::LayeredDecryptFailed)
        ));
        assert_eq!(
            decrypt_layered("test-passphrase", DISTRIBUTION_SALT, &lucky).unwrap(),
            plaintext
        );
    }

    #[test]
    fn test_outer_layer_wraps_a_full_blob() {
        let plaintext = br#"{"a":1}"#;
        let blob = encrypt_layered("test-passphrase", LOCAL_SALT, plaintext).unwrap();
        // inner = IV + 1 block; outer = IV + padded(inner) = IV + 3 blocks.
        let inner_len = IV_LENGTH + BLOCK_SIZE;
        assert_eq!(blob.len(), IV_LENGTH + (inner_len / BLOCK_SIZE + 1) * BLOCK_SIZE);
    }

    #[test]
    fn test_single_layer_blob_is_not_layered() {
        let key = derive_key("test-passphrase", LOCAL_SALT).unwrap();
        let blob = encrypt_once(&key, br#"{"a":1}"#).unwrap();
        let result = decrypt_layered("test-passphrase", LOCAL_SALT, &blob);
        assert!(matches!(result, Err(StrataError::LayeredDecryptFailed)));
    }

    #[test]
    fn test_truncated_blob() {
        let result = decrypt_layered("test-passphrase", LOCAL_SALT, &[1, 2, 3]);
        assert!(matches!(result, Err(StrataError::LayeredDecryptFailed)));
    }

    #[test]
    fn test_empty_passphrase_is_credential_error() {
        let result = encrypt_layered("", LOCAL_SALT, b"x");
        assert!(matches!(result, Err(StrataError::InvalidCredential(_))));
    }
}
