//! Secure loader: the consumer-facing read path.
//!
//! [`SecureLoader::load`] resolves a logical name to structured data, trying in order:
//!
//! 1. the native decryptor (when configured) out of process,
//! 2. the sealed / layered formats in process,
//! 3. the legacy single-layer format,
//! 4. the plaintext `<name>.json`, only when no local passphrase is
//!    configured or the local artifact does not exist.
//!
//! Every failure along the way is logged at `debug` and swallowed; callers
//! see `Some(value)` or `None` and must treat `None` as "feature unavailable".

mod decryptor;
mod native;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::artifact::{DataDir, LogicalFile};
use crate::cipher::ArtifactFormat;
use crate::domain::Domain;
use crate::error::{Result, StrataError};
use crate::maintenance::{re_encrypt, ReEncryptReport};

pub use decryptor::{Decryptor, InProcessDecryptor, LegacyDecryptor};
pub use native::{NativeDecryptor, DEFAULT_NATIVE_TIMEOUT};

/// Environment variable holding the local passphrase.
pub const LOCAL_KEY_ENV: &str = "STRATA_LOCAL_KEY";

/// Environment variable holding the distribution passphrase.
pub const DISTRIBUTION_KEY_ENV: &str = "STRATA_DIST_KEY";

/// Environment variable naming the native decryptor binary.
pub const NATIVE_DECRYPTOR_ENV: &str = "STRATA_NATIVE_DECRYPTOR";

/// Inputs for building a [`SecureLoader`].
#[derive(Debug)]
pub struct LoaderConfig {
    pub dir: DataDir,
    pub local_passphrase: Option<SecretString>,
    pub native_binary: Option<PathBuf>,
    pub native_timeout: Duration,
}

impl LoaderConfig {
    pub fn new(dir: DataDir) -> Self {
        Self {
            dir,
            local_passphrase: None,
            native_binary: None,
            native_timeout: DEFAULT_NATIVE_TIMEOUT,
        }
    }

    /// Read the passphrase and native binary from the environment.
    ///
    /// Blank values count as unset.
    pub fn from_env(dir: DataDir) -> Self {
        let mut config = Self::new(dir);
        config.local_passphrase = non_blank_env(LOCAL_KEY_ENV).map(SecretString::from);
        config.native_binary = non_blank_env(NATIVE_DECRYPTOR_ENV).map(PathBuf::from);
        config
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.local_passphrase = Some(SecretString::from(passphrase.into()));
        self
    }

    pub fn with_native_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.native_binary = Some(binary.into());
        self
    }

    pub fn with_native_timeout(mut self, timeout: Duration) -> Self {
        self.native_timeout = timeout;
        self
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read-only access to decrypted data files, with a per-instance cache.
pub struct SecureLoader {
    dir: DataDir,
    passphrase: Option<SecretString>,
    chain: Vec<Box<dyn Decryptor>>,
    cache: Mutex<HashMap<String, Value>>,
}

impl SecureLoader {
    /// Build a loader with the standard chain: native (if configured), in-process, legacy.
    pub fn new(config: LoaderConfig) -> Self {
        let mut chain: Vec<Box<dyn Decryptor>> = Vec::new();
        if let Some(binary) = config.native_binary.as_ref() {
            chain.push(Box::new(NativeDecryptor::new(
                binary.clone(),
                config.native_timeout,
            )));
        }
        chain.push(Box::new(InProcessDecryptor));
        chain.push(Box::new(LegacyDecryptor));
        Self::with_decryptors(config, chain)
    }

    /// Build a loader with an explicit decryptor chain, tried in order.
    pub fn with_decryptors(config: LoaderConfig, chain: Vec<Box<dyn Decryptor>>) -> Self {
        Self {
            dir: config.dir,
            passphrase: config.local_passphrase,
            chain,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &DataDir {
        &self.dir
    }

    /// Names of the decryptors in the order they are tried.
    pub fn chain(&self) -> Vec<&'static str> {
        self.chain.iter().map(|d| d.name()).collect()
    }

    /// Load `name` as structured data, or `None` when it is unavailable.
    pub fn load(&self, name: &str) -> Option<Value> {
        let file = match self.dir.file(name) {
            Ok(file) => file,
            Err(err) => {
                debug!(name, error = %err, "load of unknown data file");
                return None;
            }
        };

        if let Some(value) = self.cache().get(name) {
            return Some(value.clone());
        }

        let artifact = self.dir.local_artifact_path(file);
        let value = match self.passphrase.as_ref() {
            Some(passphrase) if artifact.exists() => self.decrypt_chain(&artifact, passphrase),
            _ => self.read_plaintext(file),
        }?;

        self.cache().insert(name.to_string(), value.clone());
        Some(value)
    }

    /// Drop the cached value for `name`.
    pub fn invalidate(&self, name: &str) {
        self.cache().remove(name);
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Upgrade every local artifact to `format` with the configured passphrase,
    /// then clear the cache.
    pub fn re_encrypt(&self, format: ArtifactFormat) -> Result<ReEncryptReport> {
        let passphrase = self.passphrase.as_ref().ok_or_else(|| {
            StrataError::InvalidCredential("No local passphrase configured".to_string())
        })?;
        let report = re_encrypt(&self.dir, passphrase.expose_secret(), format);
        self.clear_cache();
        report
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned cache only means another reader panicked mid-insert.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn decrypt_chain(&self, artifact: &Path, passphrase: &SecretString) -> Option<Value> {
        for decryptor in &self.chain {
            let bytes = match decryptor.decrypt(artifact, passphrase, Domain::Local) {
                Ok(bytes) => bytes,
                Err(err) => {
                    debug!(decryptor = decryptor.name(), error = %err, "decrypt step failed");
                    continue;
                }
            };
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => {
                    debug!(decryptor = decryptor.name(), path = %artifact.display(), "loaded");
                    return Some(value);
                }
                Err(err) => {
                    debug!(decryptor = decryptor.name(), error = %err, "output is not JSON");
                }
            }
        }
        None
    }

    fn read_plaintext(&self, file: &LogicalFile) -> Option<Value> {
        let path = self.dir.plaintext_path(file);
        let bytes = std::fs::read(&path)
            .map_err(|err| debug!(path = %path.display(), error = %err, "no plaintext"))
            .ok()?;
        serde_json::from_slice(&bytes)
            .map_err(|err| debug!(path = %path.display(), error = %err, "plaintext is not JSON"))
            .ok()
    }
}

impl std::fmt::Debug for SecureLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureLoader")
            .field("dir", &self.dir)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("chain", &self.chain())
            .finish()
    }
}
