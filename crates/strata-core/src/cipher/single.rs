//! Single-layer AES-256-CBC cipher.
//!
//! Blob layout:
//!
//! ```text
//! [16 bytes: random IV][N * 16 bytes: ciphertext, PKCS#7 padded]
//! ```
//!
//! There is no authentication tag. A wrong key and corrupted bytes both show
//! up as a padding failure, and a successful unpad proves nothing about
//! authenticity.

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::crypto::DerivedKey;
use crate::error::{Result, StrataError};

/// IV length in bytes (one AES block).
pub const IV_LENGTH: usize = 16;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Fill an array from the OS random source.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| StrataError::Crypto(format!("Failed to generate random bytes: {}", e)))?;
    Ok(bytes)
}

/// Encrypt `plaintext` under `key` with a fresh IV; returns `IV || ciphertext`.
pub fn encrypt_once(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let iv = random_bytes::<IV_LENGTH>()?;
    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .map_err(|e| StrataError::Crypto(format!("Failed to create CBC encryptor: {}", e)))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(IV_LENGTH + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Split `blob` into IV and ciphertext, decrypt, and strip padding.
///
/// # Errors
///
/// - `BlobTooShort` if the blob cannot hold an IV
/// - `PaddingInvalid` if unpadding fails (wrong key, corruption, or a
///   ciphertext that is empty or not block aligned)
pub fn decrypt_once(key: &DerivedKey, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < IV_LENGTH {
        return Err(StrataError::BlobTooShort { len: blob.len() });
    }
    let (iv, ciphertext) = blob.split_at(IV_LENGTH);
    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| StrataError::Crypto(format!("Failed to create CBC decryptor: {}", e)))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| StrataError::PaddingInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::derive_key;

    fn test_key(salt: &str) -> DerivedKey {
        derive_key("test-passphrase-secure-123", salt).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = test_key("single-layer-salt");
        let plaintext = br#"{"rules":["be kind"]}"#;

        let blob = encrypt_once(&key, plaintext).unwrap();
        assert_eq!(decrypt_once(&key, &blob).unwrap(), plaintext);
    }

    #[test]
    fn test_blob_layout() {
        let key = test_key("single-layer-salt");
        for len in [0usize, 1, 15, 16, 17, 100] {
            let blob = encrypt_once(&key, &vec![0x42; len]).unwrap();
            let ciphertext_len = blob.len() - IV_LENGTH;
            assert_eq!(ciphertext_len % BLOCK_SIZE, 0);
            // PKCS#7 always adds at least one byte of padding.
            assert_eq!(ciphertext_len, (len / BLOCK_SIZE + 1) * BLOCK_SIZE);
        }
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = test_key("single-layer-salt");
        let a = encrypt_once(&key, b"same plaintext").unwrap();
        let b = encrypt_once(&key, b"same plaintext").unwrap();
        assert_ne!(a[..IV_LENGTH], b[..IV_LENGTH]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_blob_rejected() {
        let key = test_key("single-layer-salt");
        let result = decrypt_once(&key, &[0u8; 15]);
        assert!(matches!(result, Err(StrataError::BlobTooShort { len: 15 })));
    }

    #[test]
    fn test_iv_only_blob_is_padding_failure() {
        let key = test_key("single-layer-salt");
        let result = decrypt_once(&key, &[0u8; IV_LENGTH]);
        assert!(matches!(result, Err(StrataError::PaddingInvalid)));
    }

    #[test]
    fn test_unaligned_ciphertext_is_padding_failure() {
        let key = test_key("single-layer-salt");
        let mut blob = encrypt_once(&key, b"hello").unwrap();
        blob.push(0);
        assert!(matches!(
            decrypt_once(&key, &blob),
            Err(StrataError::PaddingInvalid)
        ));
    }

    #[test]
    fn test_wrong_key_fails_or_garbles() {
        let key = test_key("single-layer-salt");
        let wrong = test_key("another-salt");
        let plaintext = b"secret data that spans more than one block";
        let blob = encrypt_once(&key, plaintext).unwrap();

        // Without a tag a wrong key occasionally unpads; it never recovers the plaintext.
        match decrypt_once(&wrong, &blob) {
            Err(err) => assert!(matches!(err, StrataError::PaddingInvalid)),
            Ok(garbage) => assert_ne!(garbage, plaintext),
        }
    }
}
