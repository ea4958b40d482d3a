use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use strata_core::{ArtifactFormat, Domain, VERSION};

use crate::constants::{CONFIG_ENV, DATA_DIR_ENV};

/// Strata - layered at-rest encryption for structured configuration files
#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding plaintext files and artifacts
    #[arg(long, global = true, env = DATA_DIR_ENV, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Artifact format for writes
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Legacy,
    Layered,
    Sealed,
}

impl From<FormatArg> for ArtifactFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Legacy => ArtifactFormat::Legacy,
            FormatArg::Layered => ArtifactFormat::Layered,
            FormatArg::Sealed => ArtifactFormat::Sealed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainArg {
    Local,
    #[value(alias = "git")]
    Distribution,
}

impl From<DomainArg> for Domain {
    fn from(value: DomainArg) -> Self {
        match value {
            DomainArg::Local => Domain::Local,
            DomainArg::Distribution => Domain::Distribution,
        }
    }
}

/// Passphrase argument shared by every key-taking command
#[derive(Args)]
pub struct KeyArgs {
    /// Passphrase (falls back to the domain's env var, then a prompt)
    #[arg(value_name = "KEY")]
    pub key: Option<String>,
}

/// Arguments for the `verify` command
#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Also check distribution artifacts with this passphrase
    #[arg(long, value_name = "KEY", env = "STRATA_DIST_KEY", hide_env_values = true)]
    pub dist_key: Option<String>,
}

/// Arguments for the `decrypt-file` command
#[derive(Args)]
pub struct DecryptFileArgs {
    /// Artifact to decrypt
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Key domain of the artifact
    #[arg(long, value_enum, default_value = "local")]
    pub domain: DomainArg,

    #[command(flatten)]
    pub key: KeyArgs,
}

/// Arguments for the `load` command
#[derive(Args)]
pub struct LoadArgs {
    /// Logical data file name (e.g. rules-index)
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt every plaintext file into its local artifact
    EncryptLocal(KeyArgs),

    /// Recover plaintext files from local artifacts
    DecryptLocal(KeyArgs),

    /// Write placeholder distribution artifacts (safe to commit)
    EncryptGit(KeyArgs),

    /// Decrypt and show distribution artifacts
    DecryptGit(KeyArgs),

    /// Upgrade local artifacts to the current format
    ReEncrypt(KeyArgs),

    /// Check at-rest invariants without changing anything
    Verify(VerifyArgs),

    /// Decrypt one artifact to stdout (native decryptor protocol)
    #[command(name = "decrypt-file")]
    DecryptFile(DecryptFileArgs),

    /// Load a data file through the consumer read path and print it
    Load(LoadArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
