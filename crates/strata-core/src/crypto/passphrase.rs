//! Passphrase policy for writes.
//!
//! A blank passphrase is refused. A short one is accepted with a warning so
//! that every write path (encrypt, re-encrypt) behaves the same and artifacts
//! keyed by older short passphrases can still be rewritten.

use tracing::warn;

use crate::error::{Result, StrataError};

/// Passphrases shorter than this are logged as weak.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// True when `passphrase` is shorter than the recommended length.
pub fn is_short(passphrase: &str) -> bool {
    passphrase.chars().count() < MIN_PASSPHRASE_LENGTH
}

/// Check a passphrase before producing new artifacts.
///
/// # Examples
///
/// ```
/// use strata_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("correct-horse-battery").is_ok());
/// assert!(validate_passphrase("hunter2").is_ok());
/// assert!(validate_passphrase("   ").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(StrataError::InvalidCredential(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    if is_short(passphrase) {
        warn!(
            min = MIN_PASSPHRASE_LENGTH,
            "passphrase is shorter than recommended"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_passphrase() {
        assert!(validate_passphrase("my-secure-passphrase-123").is_ok());
        assert!(!is_short("12345678"));
    }

    #[test]
    fn test_short_passphrase_accepted() {
        assert!(is_short("hunter2"));
        assert!(validate_passphrase("hunter2").is_ok());
    }

    #[test]
    fn test_passphrase_blank() {
        assert!(validate_passphrase("").is_err());
        assert!(validate_passphrase("   \t\n   ").is_err());
    }
}
