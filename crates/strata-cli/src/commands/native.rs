//! `decrypt-file`: the out-of-process side of the loader's native decryptor.
//!
//! Writes the decrypted JSON and nothing else to stdout.

use std::io::Write;

use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use strata_core::{decrypt_any, Domain, StrataError};

use crate::app::resolve_passphrase;
use crate::cli::DecryptFileArgs;
use crate::errors::{from_core, CliError};

pub fn handle_decrypt_file(args: &DecryptFileArgs) -> anyhow::Result<()> {
    let domain = Domain::from(args.domain);
    let passphrase = resolve_passphrase(args.key.key.as_deref(), domain)?;

    if !args.file.is_file() {
        return Err(CliError::not_found(
            format!("No artifact at {}", args.file.display()),
            "Hint: Pass the path of a .enc or .git.enc file.",
        )
        .into());
    }
    let blob = std::fs::read(&args.file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.file.display(), e))?;

    let (plain, format) =
        decrypt_any(passphrase.expose_secret(), domain, &blob).map_err(from_core)?;
    serde_json::from_slice::<Value>(&plain).map_err(|e| from_core(StrataError::from(e)))?;
    debug!(format = %format, domain = %domain, "decrypted artifact");

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plain)?;
    stdout.flush()?;
    Ok(())
}
