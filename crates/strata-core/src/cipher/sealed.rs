//! Authenticated two-layer format.
//!
//! Same key structure as the layered CBC format (domain salt inside, wrapper
//! salt outside), but each layer is an AEAD so tampering and wrong keys are
//! detected by tag verification instead of padding luck.
//!
//! ```text
//! blob  = MAGIC(4) || VERSION(1) || outer_nonce(12) || ChaCha20-Poly1305(outer_key, inner, aad = MAGIC||VERSION)
//! inner = inner_nonce(12) || AES-256-GCM(inner_key, plaintext)
//! ```

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use zeroize::Zeroizing;

use crate::cipher::layered::outer_passphrase;
use crate::cipher::single::random_bytes;
use crate::crypto::{derive_sealed_key, DerivedKey};
use crate::domain::WRAPPER_SALT;
use crate::error::{Result, StrataError};

/// Leading bytes identifying a sealed artifact.
pub const SEALED_MAGIC: &[u8; 4] = b"STRS";

/// Current sealed format version.
pub const SEALED_VERSION: u8 = 1;

const HEADER_LENGTH: usize = SEALED_MAGIC.len() + 1;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

fn header() -> [u8; HEADER_LENGTH] {
    let mut header = [0u8; HEADER_LENGTH];
    header[..SEALED_MAGIC.len()].copy_from_slice(SEALED_MAGIC);
    header[SEALED_MAGIC.len()] = SEALED_VERSION;
    header
}

/// True if `blob` starts with the sealed header.
pub fn is_sealed(blob: &[u8]) -> bool {
    blob.len() >= HEADER_LENGTH && blob[..HEADER_LENGTH] == header()
}

fn seal_inner(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| StrataError::Crypto(format!("AES-GCM init: {}", e)))?;
    let nonce = random_bytes::<NONCE_LENGTH>()?;
    let ciphertext = cipher
        .encrypt(aes_gcm::Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| StrataError::Crypto(format!("AES-GCM encrypt: {}", e)))?;

    let mut out = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

fn open_inner(key: &DerivedKey, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(StrataError::LayeredDecryptFailed);
    }
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| StrataError::Crypto(format!("AES-GCM init: {}", e)))?;
    let (nonce, ciphertext) = data.split_at(NONCE_LENGTH);
    cipher
        .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| StrataError::LayeredDecryptFailed)
}

/// Encrypt `plaintext` as a sealed blob.
pub fn encrypt_sealed(passphrase: &str, domain_salt: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let inner_key = derive_sealed_key(passphrase, domain_salt)?;
    let inner = Zeroizing::new(seal_inner(&inner_key, plaintext)?);

    let outer_key = derive_sealed_key(&outer_passphrase(passphrase), WRAPPER_SALT)?;
    let cipher = ChaCha20Poly1305::new_from_slice(outer_key.as_bytes())
        .map_err(|e| StrataError::Crypto(format!("ChaCha20-Poly1305 init: {}", e)))?;
    let header = header();
    let nonce = random_bytes::<NONCE_LENGTH>()?;
    let ciphertext = cipher
        .encrypt(
            chacha20poly1305::Nonce::from_slice(&nonce),
            Payload {
                msg: &inner,
                aad: &header,
            },
        )
        .map_err(|e| StrataError::Crypto(format!("ChaCha20-Poly1305 encrypt: {}", e)))?;

    let mut blob = Vec::with_capacity(HEADER_LENGTH + NONCE_LENGTH + ciphertext.len());
    blob.extend_from_slice(&header);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a sealed blob.
///
/// # Errors
///
/// - `LayeredDecryptFailed` on a missing header, truncation, tampering, a
///   wrong passphrase or a wrong domain
/// - `InvalidCredential` for an empty passphrase
pub fn decrypt_sealed(passphrase: &str, domain_salt: &str, blob: &[u8]) -> Result<Vec<u8>> {
    if !is_sealed(blob) || blob.len() < HEADER_LENGTH + NONCE_LENGTH + TAG_LENGTH {
        return Err(StrataError::LayeredDecryptFailed);
    }
    let (header, rest) = blob.split_at(HEADER_LENGTH);
    let (nonce, ciphertext) = rest.split_at(NONCE_LENGTH);

    let outer_key = derive_sealed_key(&outer_passphrase(passphrase), WRAPPER_SALT)?;
    let cipher = ChaCha20Poly1305::new_from_slice(outer_key.as_bytes())
        .map_err(|e| StrataError::Crypto(format!("ChaCha20-Poly1305 init: {}", e)))?;
    let inner = Zeroizing::new(
        cipher
            .decrypt(
                chacha20poly1305::Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| StrataError::LayeredDecryptFailed)?,
    );

    let inner_key = derive_sealed_key(passphrase, domain_salt)?;
    open_inner(&inner_key, &inner)
}
