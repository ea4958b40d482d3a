//! Passphrase resolution: argument, then environment, then a hidden prompt.

use dialoguer::Password;
use secrecy::SecretString;

use strata_core::loader::{DISTRIBUTION_KEY_ENV, LOCAL_KEY_ENV};
use strata_core::Domain;

use crate::errors::CliError;
use crate::ui::UiContext;

pub fn key_env(domain: Domain) -> &'static str {
    match domain {
        Domain::Distribution => DISTRIBUTION_KEY_ENV,
        _ => LOCAL_KEY_ENV,
    }
}

/// Resolve the passphrase for `domain`. Blank values count as absent.
pub fn resolve_passphrase(arg: Option<&str>, domain: Domain) -> anyhow::Result<SecretString> {
    let env_value = std::env::var(key_env(domain)).ok();
    if let Some(found) = pick(arg, env_value.as_deref()) {
        return Ok(SecretString::from(found.to_string()));
    }
    if !UiContext::is_interactive() {
        return Err(CliError::not_found(
            format!("No {} passphrase provided and no TTY available", domain),
            format!("Hint: Pass KEY or set {}.", key_env(domain)),
        )
        .into());
    }
    let value = Password::new()
        .with_prompt(format!("{} passphrase", domain))
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?;
    if value.trim().is_empty() {
        return Err(CliError::invalid_input("Passphrase must not be empty").into());
    }
    Ok(SecretString::from(value))
}

fn pick<'a>(arg: Option<&'a str>, env_value: Option<&'a str>) -> Option<&'a str> {
    arg.filter(|v| !v.trim().is_empty())
        .or_else(|| env_value.filter(|v| !v.trim().is_empty()))
}
