use secrecy::ExposeSecret;

use strata_core::targets::{Action, PLACEHOLDER_NOTE};
use strata_core::{Domain, DualTarget};

use crate::app::{resolve_passphrase, AppContext};
use crate::cli::KeyArgs;
use crate::errors::{from_core, CliError};
use crate::ui::{badge, hint, kv, print, Badge};

use super::render_outcomes;

pub fn handle_encrypt_git(ctx: &AppContext, args: &KeyArgs) -> anyhow::Result<()> {
    let passphrase = resolve_passphrase(args.key.as_deref(), Domain::Distribution)?;
    let outcomes = DualTarget::new(&ctx.data_dir, ctx.format)
        .encrypt_all_distribution(passphrase.expose_secret())
        .map_err(from_core)?;
    render_outcomes(ctx, "encrypt-git", &outcomes, true)
}

pub fn handle_decrypt_git(ctx: &AppContext, args: &KeyArgs) -> anyhow::Result<()> {
    let passphrase = resolve_passphrase(args.key.as_deref(), Domain::Distribution)?;
    let outcomes = DualTarget::new(&ctx.data_dir, ctx.format)
        .inspect_all_distribution(passphrase.expose_secret())
        .map_err(from_core)?;

    let leaks = outcomes
        .iter()
        .filter(|o| o.action == Action::RealContent)
        .count();
    render_outcomes(ctx, "decrypt-git", &outcomes, leaks == 0)?;

    if leaks > 0 {
        print(
            &ctx.ui,
            &badge(
                &ctx.ui,
                Badge::Warn,
                &format!("{} distribution artifact(s) hold real content", leaks),
            ),
        );
        print(
            &ctx.ui,
            &hint(&ctx.ui, "Run `strata encrypt-git` to replace them with placeholders."),
        );
        return Err(CliError::check_failed("decrypt-git", leaks).into());
    }
    if outcomes.iter().any(|o| o.action == Action::Placeholder) {
        print(&ctx.ui, &kv(&ctx.ui, "Note", PLACEHOLDER_NOTE));
    }
    Ok(())
}
