pub mod git;
pub mod local;
pub mod maintenance;
pub mod misc;
pub mod native;

use strata_core::targets::{Action, FileOutcome};

use crate::app::AppContext;
use crate::output::{print_json, Report};
use crate::ui::{header, print, receipt, table};

pub(crate) fn action_label(action: &Action) -> &'static str {
    match action {
        Action::Encrypted => "encrypted",
        Action::Decrypted => "decrypted",
        Action::Skipped => "skipped",
        Action::Placeholder => "placeholder",
        Action::RealContent => "REAL CONTENT",
    }
}

/// Render per-file outcomes of a batch command.
pub(crate) fn render_outcomes(
    ctx: &AppContext,
    command: &str,
    outcomes: &[FileOutcome],
    ok: bool,
) -> anyhow::Result<()> {
    if ctx.ui.mode.is_json() {
        return print_json(&Report::new(command, ok, ctx.data_dir_display(), outcomes));
    }

    print(&ctx.ui, &header(&ctx.ui, command, Some(&ctx.data_dir_display())));
    let rows: Vec<Vec<String>> = outcomes
        .iter()
        .map(|o| {
            vec![
                o.name.clone(),
                action_label(&o.action).to_string(),
                o.format.map(|f| f.to_string()).unwrap_or_else(|| "-".to_string()),
                o.bytes.to_string(),
            ]
        })
        .collect();
    print(&ctx.ui, &table(&ctx.ui, &["File", "Action", "Format", "Bytes"], &rows));

    if ok {
        let done = outcomes
            .iter()
            .filter(|o| o.action != Action::Skipped)
            .count();
        print(
            &ctx.ui,
            &receipt(&ctx.ui, command, &[("Files", done.to_string())]),
        );
    }
    Ok(())
}
