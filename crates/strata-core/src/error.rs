//! Error types for Strata core operations.
//!
//! Decrypt-path errors are deliberately coarse: a CBC layer cannot tell a
//! wrong key from corrupted bytes, so both surface as `PaddingInvalid` (single
//! layer) or `LayeredDecryptFailed` (either layer of a layered artifact).
//! The CLI layer maps these to operator-facing messages and exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;

/// Core error type for Strata operations.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Malformed passphrase input (empty)
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Blob shorter than the 16-byte IV
    #[error("Blob too short: {len} bytes")]
    BlobTooShort { len: usize },

    /// Padding check failed after decrypt (wrong key or corrupted data)
    #[error("Padding invalid (wrong key or corrupted data)")]
    PaddingInvalid,

    /// Either layer of a layered artifact failed to decrypt
    #[error("Layered decrypt failed")]
    LayeredDecryptFailed,

    /// Expected encrypted artifact does not exist
    #[error("Artifact missing: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// Plaintext found next to its encrypted artifact
    #[error("Plaintext leak: {} exists alongside its artifact", .0.display())]
    ArtifactLeak(PathBuf),

    /// Logical name is not part of the configured file set
    #[error("Unknown data file: {0}")]
    UnknownFile(String),

    /// Logical name is not a valid file stem
    #[error("Invalid data file name: {0}")]
    InvalidName(String),

    /// Out-of-process decryptor failed
    #[error("Native decryptor error: {0}")]
    NativeDecryptor(String),

    /// Cipher setup or encryption error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl StrataError {
    /// True for failures that mean "these bytes did not open with this key".
    ///
    /// The loader treats these as "try the next fallback".
    pub fn is_decrypt_failure(&self) -> bool {
        matches!(
            self,
            StrataError::BlobTooShort { .. }
                | StrataError::PaddingInvalid
                | StrataError::LayeredDecryptFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_failure_classification() {
        assert!(StrataError::PaddingInvalid.is_decrypt_failure());
        assert!(StrataError::LayeredDecryptFailed.is_decrypt_failure());
        assert!(StrataError::BlobTooShort { len: 3 }.is_decrypt_failure());
        assert!(!StrataError::InvalidCredential("empty".into()).is_decrypt_failure());
        assert!(!StrataError::ArtifactMissing(PathBuf::from("x.enc")).is_decrypt_failure());
    }

    #[test]
    fn test_error_messages() {
        let err = StrataError::ArtifactLeak(PathBuf::from("data/rules-index.json"));
        assert!(err.to_string().contains("rules-index.json"));
        assert_eq!(
            StrataError::BlobTooShort { len: 4 }.to_string(),
            "Blob too short: 4 bytes"
        );
    }
}
