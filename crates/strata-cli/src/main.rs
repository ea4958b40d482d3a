//! Strata CLI - layered at-rest encryption for structured configuration files
//!
//! Operator surface over `strata-core`: produce and recover local artifacts,
//! manage distribution placeholders, migrate formats and verify the data
//! directory. Also serves as the loader's native decryptor via `decrypt-file`.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;
mod ui;

use clap::Parser;
use strata_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{git, local, maintenance, misc, native};
use crate::constants::exit_codes;
use crate::errors::CliError;
use crate::ui::{print_error, UiContext};

fn main() {
    let cli = Cli::parse();
    let ctx = match AppContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => fail(&UiContext::from_env(cli.json, cli.quiet), &e),
    };
    init_logging(&ctx.log_level(cli.verbose));

    if let Err(e) = run(&ctx, &cli) {
        fail(&ctx.ui, &e);
    }
}

/// Logs go to stderr; stdout carries command output only.
fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn fail(ui: &UiContext, err: &anyhow::Error) -> ! {
    let message = format!("{}", err);
    let (message, hint) = split_hint(&message);
    print_error(ui, message, hint);
    let code = err
        .downcast_ref::<CliError>()
        .map(CliError::exit_code)
        .unwrap_or(exit_codes::FAILURE);
    std::process::exit(code)
}

/// Split a trailing "Hint: ..." line off an error message.
fn split_hint(message: &str) -> (&str, Option<&str>) {
    match message.find("\nHint:") {
        Some(idx) => (&message[..idx], Some(&message[idx + 1..])),
        None => (message, None),
    }
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::EncryptLocal(args)) => local::handle_encrypt_local(ctx, args)?,
        Some(Commands::DecryptLocal(args)) => local::handle_decrypt_local(ctx, args)?,
        Some(Commands::EncryptGit(args)) => git::handle_encrypt_git(ctx, args)?,
        Some(Commands::DecryptGit(args)) => git::handle_decrypt_git(ctx, args)?,
        Some(Commands::ReEncrypt(args)) => maintenance::handle_re_encrypt(ctx, args)?,
        Some(Commands::Verify(args)) => maintenance::handle_verify(ctx, args)?,
        Some(Commands::DecryptFile(args)) => native::handle_decrypt_file(args)?,
        Some(Commands::Load(args)) => misc::handle_load(ctx, args)?,
        Some(Commands::Completions(args)) => misc::handle_completions(args)?,
        None => {
            println!("Strata v{}", VERSION);
            println!("\nQuickstart:");
            println!("  export STRATA_LOCAL_KEY=...");
            println!("  strata encrypt-local");
            println!("  strata verify");
            println!("  strata load rules-index");
            println!("\nRun `strata --help` for full usage.");
        }
    }

    Ok(())
}
