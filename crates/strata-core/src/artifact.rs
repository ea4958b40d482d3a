//! Logical data files and their on-disk artifacts.
//!
//! For a logical file `<name>` inside the data directory:
//!
//! - `<name>.json`     plaintext
//! - `<name>.enc`      local artifact (real content)
//! - `<name>.git.enc`  distribution artifact (placeholder only)

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cipher::{is_sealed, ArtifactFormat};
use crate::domain::Domain;
use crate::error::{Result, StrataError};

/// Logical files managed when no explicit set is configured.
pub const DEFAULT_FILES: &[&str] = &["rules-index", "minds-index", "vibe-library"];

const PLAINTEXT_EXTENSION: &str = "json";
const LOCAL_EXTENSION: &str = "enc";
const DISTRIBUTION_EXTENSION: &str = "git.enc";

/// A named unit of configuration content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalFile {
    name: String,
}

impl LogicalFile {
    /// Create a logical file, validating that `name` is a plain file stem.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !valid {
            return Err(StrataError::InvalidName(name));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LogicalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The data directory together with the set of logical files it holds.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
    files: Vec<LogicalFile>,
}

impl DataDir {
    /// Data directory managing [`DEFAULT_FILES`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let files = DEFAULT_FILES
            .iter()
            .map(|name| LogicalFile {
                name: (*name).to_string(),
            })
            .collect();
        Self {
            root: root.into(),
            files,
        }
    }

    /// Data directory managing an explicit set of logical names.
    pub fn with_files<I, S>(root: impl Into<PathBuf>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<LogicalFile> = Vec::new();
        for name in names {
            let file = LogicalFile::new(name)?;
            if !files.contains(&file) {
                files.push(file);
            }
        }
        Ok(Self {
            root: root.into(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[LogicalFile] {
        &self.files
    }

    /// Look up a configured logical file by name.
    pub fn file(&self, name: &str) -> Result<&LogicalFile> {
        self.files
            .iter()
            .find(|file| file.name == name)
            .ok_or_else(|| StrataError::UnknownFile(name.to_string()))
    }

    pub fn plaintext_path(&self, file: &LogicalFile) -> PathBuf {
        self.root
            .join(format!("{}.{}", file.name, PLAINTEXT_EXTENSION))
    }

    pub fn local_artifact_path(&self, file: &LogicalFile) -> PathBuf {
        self.root.join(format!("{}.{}", file.name, LOCAL_EXTENSION))
    }

    pub fn distribution_artifact_path(&self, file: &LogicalFile) -> PathBuf {
        self.root
            .join(format!("{}.{}", file.name, DISTRIBUTION_EXTENSION))
    }

    /// Artifact path for `domain`. The wrapper domain has no artifact of its own.
    pub fn artifact_path(&self, file: &LogicalFile, domain: Domain) -> Result<PathBuf> {
        match domain {
            Domain::Local => Ok(self.local_artifact_path(file)),
            Domain::Distribution => Ok(self.distribution_artifact_path(file)),
            Domain::Wrapper => Err(StrataError::InvalidInput(
                "The wrapper domain has no artifacts".to_string(),
            )),
        }
    }

    /// Artifact state of a logical file, from a header sniff only.
    ///
    /// CBC formats carry no header, so `Layered` here means "headerless CBC
    /// blob"; telling legacy from layered requires trial decryption.
    pub fn state(&self, file: &LogicalFile) -> Result<ArtifactState> {
        let path = self.local_artifact_path(file);
        if !path.exists() {
            return Ok(ArtifactState::NoArtifact);
        }
        let bytes = std::fs::read(&path)?;
        if is_sealed(&bytes) {
            Ok(ArtifactState::Present(ArtifactFormat::Sealed))
        } else {
            Ok(ArtifactState::Present(ArtifactFormat::Layered))
        }
    }
}

/// Coarse lifecycle state of a local artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    NoArtifact,
    Present(ArtifactFormat),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let dir = DataDir::new("/data");
        let file = dir.file("rules-index").unwrap();
        assert_eq!(dir.plaintext_path(file), PathBuf::from("/data/rules-index.json"));
        assert_eq!(dir.local_artifact_path(file), PathBuf::from("/data/rules-index.enc"));
        assert_eq!(
            dir.distribution_artifact_path(file),
            PathBuf::from("/data/rules-index.git.enc")
        );
        assert!(dir.artifact_path(file, Domain::Wrapper).is_err());
    }

    #[test]
    fn test_invalid_names_rejected() {
        for name in ["", "../etc/passwd", "a/b", ".hidden", "white space"] {
            assert!(
                matches!(LogicalFile::new(name), Err(StrataError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(LogicalFile::new("persona_v2.index").is_ok());
    }

    #[test]
    fn test_with_files_dedups_and_unknown_lookup() {
        let dir = DataDir::with_files("/data", ["a", "b", "a"]).unwrap();
        assert_eq!(dir.files().len(), 2);
        assert!(matches!(dir.file("c"), Err(StrataError::UnknownFile(_))));
    }

    #[test]
    fn test_state_sniffing() {
        let temp = tempfile::tempdir().unwrap();
        let dir = DataDir::with_files(temp.path(), ["x"]).unwrap();
        let file = dir.file("x").unwrap().clone();
        assert_eq!(dir.state(&file).unwrap(), ArtifactState::NoArtifact);

        std::fs::write(dir.local_artifact_path(&file), [0u8; 48]).unwrap();
        assert_eq!(
            dir.state(&file).unwrap(),
            ArtifactState::Present(ArtifactFormat::Layered)
        );
    }
}
