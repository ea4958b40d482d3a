use clap::CommandFactory;
use clap_complete::generate;

use strata_core::SecureLoader;

use crate::app::AppContext;
use crate::cli::{Cli, CompletionsArgs, LoadArgs};
use crate::errors::CliError;

pub fn handle_completions(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "strata", &mut std::io::stdout());
    Ok(())
}

/// Read a data file the way consumers do and print it as JSON.
pub fn handle_load(ctx: &AppContext, args: &LoadArgs) -> anyhow::Result<()> {
    let loader = SecureLoader::new(ctx.loader_config());
    tracing::debug!(chain = ?loader.chain(), "loader ready");

    let value = loader.load(&args.name).ok_or_else(|| {
        CliError::not_found(
            format!("{} is unavailable", args.name),
            "Hint: Set STRATA_LOCAL_KEY, or run `strata verify` to see what is wrong.",
        )
    })?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
