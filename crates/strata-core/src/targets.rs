//! Local and distribution artifacts.
//!
//! Every logical file can have two artifacts under different key domains:
//!
//! - **local** (`<name>.enc`): the real plaintext, `Local` salt. Never leaves
//!   the machine that produced it.
//! - **distribution** (`<name>.git.enc`): a fixed placeholder, `Distribution`
//!   salt. Safe to commit; it keeps the repository layout stable without
//!   encoding any real content.
//!
//! Because the salts differ, a leaked distribution key cannot open local
//! artifacts even when both domains share a passphrase.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::artifact::{DataDir, LogicalFile};
use crate::cipher::{decrypt_any, encrypt_artifact, ArtifactFormat};
use crate::crypto::validate_passphrase;
use crate::domain::Domain;
use crate::error::{Result, StrataError};
use crate::fs::write_atomic;

/// Note stored in every placeholder.
pub const PLACEHOLDER_NOTE: &str = "content stripped for distribution";

/// The placeholder encrypted into distribution artifacts.
pub fn placeholder() -> Value {
    serde_json::json!({
        "_placeholder": true,
        "_note": PLACEHOLDER_NOTE,
    })
}

/// True for the placeholder object, and for `{}` written by older tooling.
pub fn is_placeholder(value: &Value) -> bool {
    match value.as_object() {
        Some(map) if map.is_empty() => true,
        Some(map) => {
            map.get("_placeholder").and_then(Value::as_bool) == Some(true)
                && map.keys().all(|k| k == "_placeholder" || k == "_note")
        }
        None => false,
    }
}

/// What happened to one logical file during a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Encrypted,
    Decrypted,
    /// Input file did not exist
    Skipped,
    /// Distribution artifact holds only the placeholder
    Placeholder,
    /// Distribution artifact holds something other than the placeholder
    RealContent,
}

/// Per-file result of a batch operation.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub name: String,
    pub path: PathBuf,
    pub action: Action,
    pub bytes: usize,
    pub format: Option<ArtifactFormat>,
}

/// Produces and reads back both artifact kinds for a data directory.
#[derive(Debug, Clone)]
pub struct DualTarget<'a> {
    dir: &'a DataDir,
    format: ArtifactFormat,
}

impl<'a> DualTarget<'a> {
    pub fn new(dir: &'a DataDir, format: ArtifactFormat) -> Self {
        Self { dir, format }
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// Encrypt the real plaintext of `file` under the local domain.
    pub fn produce_local_artifact(&self, passphrase: &str, file: &LogicalFile) -> Result<Vec<u8>> {
        let path = self.dir.plaintext_path(file);
        if !path.exists() {
            return Err(StrataError::ArtifactMissing(path));
        }
        let plaintext = Zeroizing::new(std::fs::read(&path)?);
        serde_json::from_slice::<Value>(&plaintext)?;
        encrypt_artifact(self.format, passphrase, Domain::Local, &plaintext)
    }

    /// Encrypt the placeholder under the distribution domain; `file`'s content is never read.
    pub fn produce_distribution_artifact(
        &self,
        passphrase: &str,
        _file: &LogicalFile,
    ) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(&placeholder())?;
        encrypt_artifact(self.format, passphrase, Domain::Distribution, &body)
    }

    /// Produce and write local artifacts for every file that has plaintext.
    pub fn encrypt_all_local(&self, passphrase: &str) -> Result<Vec<FileOutcome>> {
        validate_passphrase(passphrase)?;
        let mut outcomes = Vec::new();
        for file in self.dir.files() {
            let artifact = self.dir.local_artifact_path(file);
            if !self.dir.plaintext_path(file).exists() {
                warn!(file = %file, "no plaintext; skipping local artifact");
                outcomes.push(skipped(file, self.dir.plaintext_path(file)));
                continue;
            }
            let blob = self.produce_local_artifact(passphrase, file)?;
            write_atomic(&artifact, &blob)?;
            info!(file = %file, format = %self.format, bytes = blob.len(), "wrote local artifact");
            outcomes.push(FileOutcome {
                name: file.name().to_string(),
                path: artifact,
                action: Action::Encrypted,
                bytes: blob.len(),
                format: Some(self.format),
            });
        }
        Ok(outcomes)
    }

    /// Produce and write a distribution placeholder for every logical file.
    pub fn encrypt_all_distribution(&self, passphrase: &str) -> Result<Vec<FileOutcome>> {
        validate_passphrase(passphrase)?;
        let mut outcomes = Vec::new();
        for file in self.dir.files() {
            let artifact = self.dir.distribution_artifact_path(file);
            let blob = self.produce_distribution_artifact(passphrase, file)?;
            write_atomic(&artifact, &blob)?;
            info!(file = %file, format = %self.format, "wrote distribution placeholder");
            outcomes.push(FileOutcome {
                name: file.name().to_string(),
                path: artifact,
                action: Action::Encrypted,
                bytes: blob.len(),
                format: Some(self.format),
            });
        }
        Ok(outcomes)
    }

    /// Recover `<name>.json` from every local artifact (any supported format).
    pub fn decrypt_all_local(&self, passphrase: &str) -> Result<Vec<FileOutcome>> {
        let mut outcomes = Vec::new();
        for file in self.dir.files() {
            let artifact = self.dir.local_artifact_path(file);
            if !artifact.exists() {
                outcomes.push(skipped(file, artifact));
                continue;
            }
            let blob = std::fs::read(&artifact)?;
            let (plain, format) = decrypt_any(passphrase, Domain::Local, &blob)?;
            let plain = Zeroizing::new(plain);
            // Padding can succeed by chance under a wrong key; only accept JSON.
            serde_json::from_slice::<Value>(&plain)?;
            let target = self.dir.plaintext_path(file);
            write_atomic(&target, &plain)?;
            info!(file = %file, format = %format, "recovered plaintext");
            outcomes.push(FileOutcome {
                name: file.name().to_string(),
                path: target,
                action: Action::Decrypted,
                bytes: plain.len(),
                format: Some(format),
            });
        }
        Ok(outcomes)
    }

    /// Decrypt every distribution artifact and classify its content.
    pub fn inspect_all_distribution(&self, passphrase: &str) -> Result<Vec<FileOutcome>> {
        let mut outcomes = Vec::new();
        for file in self.dir.files() {
            let artifact = self.dir.distribution_artifact_path(file);
            if !artifact.exists() {
                outcomes.push(skipped(file, artifact));
                continue;
            }
            let blob = std::fs::read(&artifact)?;
            let (plain, format) = decrypt_any(passphrase, Domain::Distribution, &blob)?;
            let value: Value = serde_json::from_slice(&plain)?;
            let action = if is_placeholder(&value) {
                Action::Placeholder
            } else {
                warn!(file = %file, "distribution artifact holds real content");
                Action::RealContent
            };
            outcomes.push(FileOutcome {
                name: file.name().to_string(),
                path: artifact,
                action,
                bytes: plain.len(),
                format: Some(format),
            });
        }
        Ok(outcomes)
    }
}

fn skipped(file: &LogicalFile, path: PathBuf) -> FileOutcome {
    FileOutcome {
        name: file.name().to_string(),
        path,
        action: Action::Skipped,
        bytes: 0,
        format: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::decrypt_current;

    const PASS: &str = "test-passphrase-secure-123";

    fn data_dir() -> (tempfile::TempDir, DataDir) {
        let temp = tempfile::tempdir().unwrap();
        let dir = DataDir::with_files(temp.path(), ["rules-index", "minds-index"]).unwrap();
        (temp, dir)
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(&placeholder()));
        assert!(is_placeholder(&serde_json::json!({})));
        assert!(!is_placeholder(&serde_json::json!({"_placeholder": true, "rules": []})));
        assert!(!is_placeholder(&serde_json::json!({"rules": []})));
        assert!(!is_placeholder(&serde_json::json!([])));
    }

    #[test]
    fn test_distribution_artifact_never_contains_real_content() {
        let (_temp, dir) = data_dir();
        let file = dir.file("rules-index").unwrap();
        std::fs::write(dir.plaintext_path(file), br#"{"secret":"REAL_MARKER"}"#).unwrap();

        let target = DualTarget::new(&dir, ArtifactFormat::Layered);
        let blob = target.produce_distribution_artifact(PASS, file).unwrap();
        let (plain, _) = decrypt_current(PASS, Domain::Distribution, &blob).unwrap();
        let value: Value = serde_json::from_slice(&plain).unwrap();
        assert!(is_placeholder(&value));
        assert!(!String::from_utf8_lossy(&plain).contains("REAL_MARKER"));
    }

    #[test]
    fn test_local_artifact_isolated_from_distribution_domain() {
        let (_temp, dir) = data_dir();
        let file = dir.file("rules-index").unwrap();
        std::fs::write(dir.plaintext_path(file), br#"{"a":1}"#).unwrap();

        let target = DualTarget::new(&dir, ArtifactFormat::Sealed);
        let blob = target.produce_local_artifact(PASS, file).unwrap();
        assert!(decrypt_current(PASS, Domain::Distribution, &blob).is_err());
        let (plain, _) = decrypt_current(PASS, Domain::Local, &blob).unwrap();
        assert_eq!(plain, br#"{"a":1}"#);
    }

    #[test]
    fn test_encrypt_then_decrypt_all_local() {
        let (_temp, dir) = data_dir();
        let rules = dir.file("rules-index").unwrap().clone();
        std::fs::write(dir.plaintext_path(&rules), br#"{"rules":["r1"]}"#).unwrap();

        let target = DualTarget::new(&dir, ArtifactFormat::Layered);
        let outcomes = target.encrypt_all_local(PASS).unwrap();
        assert_eq!(outcomes[0].action, Action::Encrypted);
        assert_eq!(outcomes[1].action, Action::Skipped);
        // Encryption leaves the plaintext in place.
        assert!(dir.plaintext_path(&rules).exists());

        std::fs::remove_file(dir.plaintext_path(&rules)).unwrap();
        let outcomes = target.decrypt_all_local(PASS).unwrap();
        assert_eq!(outcomes[0].action, Action::Decrypted);
        assert_eq!(outcomes[0].format, Some(ArtifactFormat::Layered));
        assert_eq!(
            std::fs::read(dir.plaintext_path(&rules)).unwrap(),
            br#"{"rules":["r1"]}"#
        );
    }

    #[test]
    fn test_inspect_distribution_flags_real_content() {
        let (_temp, dir) = data_dir();
        let target = DualTarget::new(&dir, ArtifactFormat::Layered);
        target.encrypt_all_distribution(PASS).unwrap();

        let minds = dir.file("minds-index").unwrap();
        let leaked = encrypt_artifact(
            ArtifactFormat::Layered,
            PASS,
            Domain::Distribution,
            br#"{"persona":"real"}"#,
        )
        .unwrap();
        std::fs::write(dir.distribution_artifact_path(minds), leaked).unwrap();

        let outcomes = target.inspect_all_distribution(PASS).unwrap();
        assert_eq!(outcomes[0].action, Action::Placeholder);
        assert_eq!(outcomes[1].action, Action::RealContent);
    }

    #[test]
    fn test_passphrase_policy_for_writes() {
        let (_temp, dir) = data_dir();
        let rules = dir.file("rules-index").unwrap().clone();
        std::fs::write(dir.plaintext_path(&rules), br#"{"a":1}"#).unwrap();
        let target = DualTarget::new(&dir, ArtifactFormat::Sealed);

        assert!(target.encrypt_all_local("hunter2").is_ok());
        assert!(target.encrypt_all_distribution("hunter2").is_ok());
        assert!(matches!(
            target.encrypt_all_local("  "),
            Err(StrataError::InvalidCredential(_))
        ));
        assert!(matches!(
            target.encrypt_all_distribution(""),
            Err(StrataError::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_non_json_plaintext_is_not_encrypted() {
        let (_temp, dir) = data_dir();
        let rules = dir.file("rules-index").unwrap().clone();
        std::fs::write(dir.plaintext_path(&rules), b"rules: [r1]").unwrap();

        let target = DualTarget::new(&dir, ArtifactFormat::Layered);
        assert!(matches!(
            target.encrypt_all_local(PASS),
            Err(StrataError::Json { .. })
        ));
        assert!(!dir.local_artifact_path(&rules).exists());
    }
}
