//! Per-invocation context: resolved config, data directory and UI settings.

mod passphrase;

use std::path::PathBuf;

use strata_core::loader::{LoaderConfig, NATIVE_DECRYPTOR_ENV};
use strata_core::{ArtifactFormat, DataDir};

use crate::cli::Cli;
use crate::config::{default_config_path, default_data_dir, load_config, StrataConfig};
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::ui::UiContext;

pub use passphrase::resolve_passphrase;

pub struct AppContext {
    pub config: StrataConfig,
    pub data_dir: DataDir,
    pub format: ArtifactFormat,
    pub ui: UiContext,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = match cli.config.clone() {
            Some(path) => path,
            None => default_config_path()?,
        };
        let config = load_config(&config_path)?;

        let root = match (cli.data_dir.clone(), config.data.dir.as_deref()) {
            (Some(dir), _) => dir,
            (None, Some(dir)) => PathBuf::from(dir),
            (None, None) => default_data_dir()?,
        };
        let data_dir = if config.data.files.is_empty() {
            DataDir::new(root)
        } else {
            DataDir::with_files(root, config.data.files.iter().cloned())
                .map_err(crate::errors::from_core)?
        };

        let format = cli
            .format
            .map(ArtifactFormat::from)
            .or(config.cipher.format)
            .unwrap_or_default();

        Ok(Self {
            config,
            data_dir,
            format,
            ui: UiContext::from_env(cli.json, cli.quiet),
        })
    }

    /// Log filter directive: `-v` flags, then config, then the default.
    pub fn log_level(&self, verbose: u8) -> String {
        match verbose {
            0 => self
                .config
                .log
                .level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    pub fn data_dir_display(&self) -> String {
        self.data_dir.root().display().to_string()
    }

    /// Loader settings: environment first, config file as fallback.
    pub fn loader_config(&self) -> LoaderConfig {
        let mut loader = LoaderConfig::from_env(self.data_dir.clone());
        if std::env::var_os(NATIVE_DECRYPTOR_ENV).is_none() {
            if let Some(binary) = self.config.loader.native_binary.as_deref() {
                loader = loader.with_native_binary(binary);
            }
        }
        if let Some(timeout) = self.config.loader.native_timeout() {
            loader = loader.with_native_timeout(timeout);
        }
        loader
    }
}
