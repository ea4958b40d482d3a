//! CLI error types for structured error handling.
//!
//! Typed errors carry an operator hint and map to an exit code; anything
//! else bubbling up through `anyhow` exits with the generic failure code.

use std::fmt;

use strata_core::StrataError;

#[derive(Debug)]
pub enum CliError {
    /// Something the command needs is absent (artifact, passphrase, data file)
    NotFound { message: String, hint: String },

    /// An artifact did not open with the supplied passphrase
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// A batch command finished but reported problems
    CheckFailed { command: &'static str, issues: usize },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::CheckFailed { command, issues } => {
                write!(f, "{} reported {} problem(s)", command, issues)
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn check_failed(command: &'static str, issues: usize) -> Self {
        CliError::CheckFailed { command, issues }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. }
            | CliError::AuthFailed { .. }
            | CliError::CheckFailed { .. }
            | CliError::InvalidInput(_) => exit_codes::FAILURE,
        }
    }
}

/// Translate core errors into operator-facing ones where a hint helps.
pub fn from_core(err: StrataError) -> anyhow::Error {
    if err.is_decrypt_failure() {
        return CliError::auth_failed_with_hint(
            format!("Decryption failed: {}", err),
            "Hint: Check the passphrase for this domain (STRATA_LOCAL_KEY or STRATA_DIST_KEY).",
        )
        .into();
    }
    match err {
        StrataError::InvalidCredential(message) => CliError::invalid_input(message).into(),
        StrataError::ArtifactMissing(path) => CliError::not_found(
            format!("Artifact missing: {}", path.display()),
            "Hint: Run `strata encrypt-local` first.",
        )
        .into(),
        StrataError::UnknownFile(name) => CliError::not_found(
            format!("Unknown data file: {}", name),
            "Hint: Configured files are listed under [data] files in the config.",
        )
        .into(),
        StrataError::Json { .. } => CliError::auth_failed_with_hint(
            "Decrypted content is not valid JSON",
            "Hint: This usually means the passphrase is wrong.",
        )
        .into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_decrypt_failures_become_auth_errors() {
        let err = from_core(StrataError::LayeredDecryptFailed);
        let cli = err.downcast_ref::<CliError>().expect("typed error");
        assert!(matches!(cli, CliError::AuthFailed { .. }));
        assert!(cli.to_string().contains("Hint:"));
    }

    #[test]
    fn test_missing_artifact_has_hint() {
        let err = from_core(StrataError::ArtifactMissing(PathBuf::from("x.enc")));
        assert!(err.to_string().contains("encrypt-local"));
    }

    #[test]
    fn test_all_failures_exit_one() {
        assert_eq!(CliError::check_failed("verify", 2).exit_code(), 1);
        assert_eq!(CliError::invalid_input("bad").exit_code(), 1);
    }
}
