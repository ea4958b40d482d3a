use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use strata_core::ArtifactFormat;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StrataConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub cipher: CipherSection,
    #[serde(default)]
    pub loader: LoaderSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DataSection {
    pub dir: Option<String>,
    /// Logical file names; empty means the built-in set
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CipherSection {
    pub format: Option<ArtifactFormat>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoaderSection {
    pub native_binary: Option<String>,
    pub native_timeout_ms: Option<u64>,
}

impl LoaderSection {
    pub fn native_timeout(&self) -> Option<Duration> {
        self.native_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogSection {
    pub level: Option<String>,
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    xdg_data_dir()
}

/// Read the config at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> anyhow::Result<StrataConfig> {
    if !path.exists() {
        return Ok(StrataConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<StrataConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("strata"));
        }
    }
    Ok(home_dir()?.join(".config").join("strata"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("strata"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("strata"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [data]
            dir = "/srv/strata"
            files = ["rules-index", "persona"]

            [cipher]
            format = "layered"

            [loader]
            native_binary = "/usr/local/bin/strata"
            native_timeout_ms = 2500

            [log]
            level = "debug"
        "#;
        let config: StrataConfig = toml::from_str(toml).expect("parse config");
        assert_eq!(config.data.dir.as_deref(), Some("/srv/strata"));
        assert_eq!(config.data.files, vec!["rules-index", "persona"]);
        assert_eq!(config.cipher.format, Some(ArtifactFormat::Layered));
        assert_eq!(
            config.loader.native_timeout(),
            Some(Duration::from_millis(2500))
        );
        assert_eq!(config.log.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: StrataConfig = toml::from_str("").expect("parse config");
        assert!(config.data.dir.is_none());
        assert!(config.data.files.is_empty());
        assert!(config.cipher.format.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = load_config(&temp.path().join("absent.toml")).expect("load");
        assert!(config.loader.native_binary.is_none());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(toml::from_str::<StrataConfig>("[cipher]\nformat = \"v4\"\n").is_err());
    }

    #[test]
    fn test_xdg_paths_use_env() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/strata-config-test");
        std::env::set_var("XDG_DATA_HOME", "/tmp/strata-data-test");

        assert_eq!(
            xdg_config_dir().expect("config dir"),
            PathBuf::from("/tmp/strata-config-test").join("strata")
        );
        assert_eq!(
            xdg_data_dir().expect("data dir"),
            PathBuf::from("/tmp/strata-data-test").join("strata")
        );
    }
}
