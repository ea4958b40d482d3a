use secrecy::ExposeSecret;

use strata_core::targets::Action;
use strata_core::{Domain, DualTarget};

use crate::app::{resolve_passphrase, AppContext};
use crate::cli::KeyArgs;
use crate::errors::{from_core, CliError};

use super::render_outcomes;

pub fn handle_encrypt_local(ctx: &AppContext, args: &KeyArgs) -> anyhow::Result<()> {
    let passphrase = resolve_passphrase(args.key.as_deref(), Domain::Local)?;
    let target = DualTarget::new(&ctx.data_dir, ctx.format);
    let outcomes = target
        .encrypt_all_local(passphrase.expose_secret())
        .map_err(from_core)?;

    if outcomes.iter().all(|o| o.action == Action::Skipped) {
        return Err(CliError::not_found(
            format!("No plaintext files in {}", ctx.data_dir_display()),
            "Hint: Expected <name>.json for each configured data file.",
        )
        .into());
    }
    render_outcomes(ctx, "encrypt-local", &outcomes, true)
}

pub fn handle_decrypt_local(ctx: &AppContext, args: &KeyArgs) -> anyhow::Result<()> {
    let passphrase = resolve_passphrase(args.key.as_deref(), Domain::Local)?;
    let target = DualTarget::new(&ctx.data_dir, ctx.format);
    let outcomes = target
        .decrypt_all_local(passphrase.expose_secret())
        .map_err(from_core)?;

    if outcomes.iter().all(|o| o.action == Action::Skipped) {
        return Err(CliError::not_found(
            format!("No local artifacts in {}", ctx.data_dir_display()),
            "Hint: Run `strata encrypt-local` first.",
        )
        .into());
    }
    render_outcomes(ctx, "decrypt-local", &outcomes, true)
}
