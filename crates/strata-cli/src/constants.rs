//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// - 0: Success
/// - 1: Any operator failure
/// - 2: Usage error (emitted by clap)
pub mod exit_codes {
    /// Command completed and every check passed.
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;

    /// Any operator-visible failure (bad passphrase, failed verify, missing files).
    pub const FAILURE: i32 = 1;
}

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "STRATA_DATA_DIR";

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "STRATA_CONFIG";

/// Log level used when neither `RUST_LOG`, `-v` nor the config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
