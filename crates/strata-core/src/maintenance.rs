//! Format migration and at-rest verification.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::artifact::{ArtifactState, DataDir, LogicalFile};
use crate::cipher::{decrypt_any, encrypt_artifact, ArtifactFormat};
use crate::crypto::validate_passphrase;
use crate::domain::Domain;
use crate::error::{Result, StrataError};
use crate::fs::write_atomic;
use crate::targets::is_placeholder;

/// Hex blake3 digest of raw artifact bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    Migrated,
    /// No local artifact to migrate
    Skipped,
    /// Artifact did not open; left untouched
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    pub name: String,
    pub path: PathBuf,
    pub status: MigrationStatus,
    pub from: Option<ArtifactFormat>,
    pub to: Option<ArtifactFormat>,
    pub old_fingerprint: Option<String>,
    pub new_fingerprint: Option<String>,
    pub error: Option<String>,
}

impl MigrationOutcome {
    fn new(file: &LogicalFile, path: PathBuf, status: MigrationStatus) -> Self {
        Self {
            name: file.name().to_string(),
            path,
            status,
            from: None,
            to: None,
            old_fingerprint: None,
            new_fingerprint: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReEncryptReport {
    pub format: ArtifactFormat,
    pub outcomes: Vec<MigrationOutcome>,
}

impl ReEncryptReport {
    /// True when no file failed.
    pub fn ok(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status != MigrationStatus::Failed)
    }

    pub fn migrated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == MigrationStatus::Migrated)
            .count()
    }
}

/// Re-encrypt every local artifact into `format`.
///
/// `format` must be a layered format; migrating into `Legacy` is refused.
/// Recovered plaintext stays in memory. Files that do not open with
/// `passphrase` are reported as failed and left as they were.
pub fn re_encrypt(dir: &DataDir, passphrase: &str, format: ArtifactFormat) -> Result<ReEncryptReport> {
    if format == ArtifactFormat::Legacy {
        return Err(StrataError::InvalidInput(
            "re-encrypt target must be layered or sealed, not legacy".to_string(),
        ));
    }
    validate_passphrase(passphrase)?;

    let mut outcomes = Vec::new();
    for file in dir.files() {
        let path = dir.local_artifact_path(file);
        if dir.state(file)? == ArtifactState::NoArtifact {
            outcomes.push(MigrationOutcome::new(file, path, MigrationStatus::Skipped));
            continue;
        }

        let old = std::fs::read(&path)?;
        let mut outcome = MigrationOutcome::new(file, path.clone(), MigrationStatus::Failed);
        outcome.old_fingerprint = Some(fingerprint(&old));

        let (plain, from) = match open_json(passphrase, Domain::Local, &old) {
            Ok(found) => found,
            Err(err) => {
                warn!(file = %file, error = %err, "could not open artifact; leaving it untouched");
                outcome.error = Some(err.to_string());
                outcomes.push(outcome);
                continue;
            }
        };

        let new = encrypt_artifact(format, passphrase, Domain::Local, &plain)?;
        write_atomic(&path, &new)?;
        info!(file = %file, from = %from, to = %format, "re-encrypted artifact");

        outcome.status = MigrationStatus::Migrated;
        outcome.from = Some(from);
        outcome.to = Some(format);
        outcome.new_fingerprint = Some(fingerprint(&new));
        outcomes.push(outcome);
    }

    Ok(ReEncryptReport { format, outcomes })
}

/// Decrypt `blob` with every supported format and require a JSON body.
fn open_json(
    passphrase: &str,
    domain: Domain,
    blob: &[u8],
) -> Result<(Zeroizing<Vec<u8>>, ArtifactFormat)> {
    let (plain, format) = decrypt_any(passphrase, domain, blob)?;
    let plain = Zeroizing::new(plain);
    serde_json::from_slice::<Value>(&plain).map_err(|_| StrataError::LayeredDecryptFailed)?;
    Ok((plain, format))
}

/// A condition that fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    ArtifactLeak { path: PathBuf },
    ArtifactMissing { path: PathBuf },
    DecryptFailed { path: PathBuf, reason: String },
    PassphraseInPlaintext { path: PathBuf },
    DistributionDecryptFailed { path: PathBuf, reason: String },
    RealContentInDistribution { path: PathBuf },
}

impl Issue {
    pub fn message(&self) -> String {
        match self {
            Issue::ArtifactLeak { path } => StrataError::ArtifactLeak(path.clone()).to_string(),
            Issue::ArtifactMissing { path } => {
                StrataError::ArtifactMissing(path.clone()).to_string()
            }
            Issue::DecryptFailed { path, reason } => {
                format!("Cannot decrypt {}: {}", path.display(), reason)
            }
            Issue::PassphraseInPlaintext { path } => {
                format!("Passphrase appears verbatim in {}", path.display())
            }
            Issue::DistributionDecryptFailed { path, reason } => {
                format!("Cannot decrypt distribution artifact {}: {}", path.display(), reason)
            }
            Issue::RealContentInDistribution { path } => {
                format!("Distribution artifact {} holds real content", path.display())
            }
        }
    }
}

/// A condition worth reporting that does not fail verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Artifact is in an unauthenticated CBC format; re-encrypt to upgrade.
    LegacyFormat { format: ArtifactFormat },
}

impl Advisory {
    pub fn message(&self) -> String {
        match self {
            Advisory::LegacyFormat { format } => {
                format!("Artifact uses the {} format; run re-encrypt to upgrade", format)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    pub format: Option<ArtifactFormat>,
    pub issues: Vec<Issue>,
    pub advisories: Vec<Advisory>,
}

impl FileReport {
    pub fn ok(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub files: Vec<FileReport>,
}

impl VerifyReport {
    pub fn ok(&self) -> bool {
        self.files.iter().all(FileReport::ok)
    }

    pub fn issue_count(&self) -> usize {
        self.files.iter().map(|f| f.issues.len()).sum()
    }
}

/// Check the at-rest invariants of every logical file. Never mutates anything.
pub fn verify(
    dir: &DataDir,
    local_passphrase: &str,
    distribution_passphrase: Option<&str>,
) -> Result<VerifyReport> {
    let mut files = Vec::new();
    for file in dir.files() {
        let mut report = FileReport {
            name: file.name().to_string(),
            format: None,
            issues: Vec::new(),
            advisories: Vec::new(),
        };

        let plaintext = dir.plaintext_path(file);
        let artifact = dir.local_artifact_path(file);

        if plaintext.exists() {
            if artifact.exists() {
                report.issues.push(Issue::ArtifactLeak {
                    path: plaintext.clone(),
                });
            }
            if !local_passphrase.is_empty() {
                let body = Zeroizing::new(std::fs::read(&plaintext)?);
                if contains(&body, local_passphrase.as_bytes()) {
                    report.issues.push(Issue::PassphraseInPlaintext {
                        path: plaintext.clone(),
                    });
                }
            }
        }

        if artifact.exists() {
            let blob = std::fs::read(&artifact)?;
            match open_json(local_passphrase, Domain::Local, &blob) {
                Ok((_, format)) => {
                    report.format = Some(format);
                    if format.is_unauthenticated() {
                        report.advisories.push(Advisory::LegacyFormat { format });
                    }
                }
                Err(err) => report.issues.push(Issue::DecryptFailed {
                    path: artifact.clone(),
                    reason: err.to_string(),
                }),
            }
        } else {
            report.issues.push(Issue::ArtifactMissing {
                path: artifact.clone(),
            });
        }

        if let Some(passphrase) = distribution_passphrase {
            check_distribution(dir, file, passphrase, &mut report)?;
        }

        if !report.ok() {
            warn!(file = %file, issues = report.issues.len(), "verification failed");
        }
        files.push(report);
    }
    Ok(VerifyReport { files })
}

fn check_distribution(
    dir: &DataDir,
    file: &LogicalFile,
    passphrase: &str,
    report: &mut FileReport,
) -> Result<()> {
    let path = dir.distribution_artifact_path(file);
    if !path.exists() {
        return Ok(());
    }
    let blob = std::fs::read(&path)?;
    match decrypt_any(passphrase, Domain::Distribution, &blob) {
        Ok((plain, _)) => match serde_json::from_slice::<Value>(&plain) {
            Ok(value) if is_placeholder(&value) => {}
            Ok(_) => report.issues.push(Issue::RealContentInDistribution { path }),
            Err(err) => report.issues.push(Issue::DistributionDecryptFailed {
                path,
                reason: err.to_string(),
            }),
        },
        Err(err) => report.issues.push(Issue::DistributionDecryptFailed {
            path,
            reason: err.to_string(),
        }),
    }
    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
