//! Key derivation and passphrase policy.
//!
//! ## Security Model
//!
//! - Keys are derived from a human passphrase plus a fixed domain salt, so
//!   one passphrase yields unrelated keys per domain
//! - Memory-hard KDFs (scrypt, Argon2id) slow offline brute force
//! - Derived keys are zeroized on drop and redacted in `Debug`
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft or publication of encrypted artifacts
//! - A distribution-domain key being used against local artifacts
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Tampering with CBC artifacts (use the sealed format for that)

pub mod key;
pub mod passphrase;

pub use key::{derive_key, derive_sealed_key, DerivedKey, KEY_LENGTH};
pub use passphrase::{is_short, validate_passphrase};
