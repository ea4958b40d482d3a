//! Rendering primitives for CLI output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{ContentArrangement, Table as ComfyTable};

use super::context::UiContext;
use super::mode::OutputMode;
use super::theme::{styled, styles, Badge};

/// Render a header line for a command.
///
/// Pretty mode: "Strata · command" plus the data directory
/// Plain mode: "strata command"
pub fn header(ctx: &UiContext, command: &str, data_dir: Option<&str>) -> String {
    match ctx.mode {
        OutputMode::Pretty => {
            let title = styled("Strata", styles::bold(), ctx.color);
            let mut out = format!("{} \u{00B7} {}", title, command);
            if let Some(dir) = data_dir {
                out.push_str(&format!("\n{}", kv(ctx, "Data", dir)));
            }
            out
        }
        OutputMode::Plain => format!("strata {}", command),
        OutputMode::Json => String::new(),
    }
}

/// Render a badge with optional message.
pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let colored_badge = styled(kind.display(ctx.unicode), kind.style(), ctx.color);
    if message.is_empty() {
        colored_badge
    } else {
        format!("{} {}", colored_badge, message)
    }
}

/// Render a key-value pair.
///
/// Pretty mode: "Key: value" with dim key
/// Plain mode: "key=value"
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        let styled_key = styled(&format!("{}:", key), styles::dim(), ctx.color);
        format!("{} {}", styled_key, value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.mode.is_pretty() {
        let label = styled("Hint:", styles::dim(), ctx.color);
        format!("{} {}", label, text.trim_start_matches("Hint: "))
    } else {
        format!("hint={}", text.trim_start_matches("Hint: "))
    }
}

/// Render a receipt (summary block after an action).
pub fn receipt(ctx: &UiContext, title: &str, items: &[(&str, String)]) -> String {
    let mut lines = Vec::new();
    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Ok, title));
        for (key, value) in items {
            lines.push(format!("  {}", kv(ctx, key, value)));
        }
    } else {
        lines.push("status=ok".to_string());
        for (key, value) in items {
            lines.push(kv(ctx, key, value));
        }
    }
    lines.join("\n")
}

/// Render rows as a table in pretty mode, space-separated lines otherwise.
pub fn table(ctx: &UiContext, headers: &[&str], rows: &[Vec<String>]) -> String {
    if ctx.mode.is_pretty() {
        let mut table = ComfyTable::new();
        if ctx.unicode {
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS);
        } else {
            table.load_preset(ASCII_MARKDOWN);
        }
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(headers.to_vec());
        for row in rows {
            table.add_row(row);
        }
        table.to_string()
    } else {
        rows.iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Print an informational line unless quiet or JSON.
pub fn print(ctx: &UiContext, message: &str) {
    if !ctx.quiet && !ctx.mode.is_json() && !message.is_empty() {
        println!("{}", message);
    }
}

pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let mut lines = Vec::new();
    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Err, message));
        if let Some(h) = error_hint {
            lines.push(hint(ctx, h));
        }
    } else {
        lines.push(format!("error={}", message));
        if let Some(h) = error_hint {
            lines.push(hint(ctx, h));
        }
    }
    lines.join("\n")
}

/// Print an error message to stderr with optional hint.
pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_ctx() -> UiContext {
        UiContext {
            color: false,
            unicode: false,
            quiet: false,
            mode: OutputMode::Plain,
        }
    }

    fn pretty_ctx() -> UiContext {
        UiContext {
            color: false,
            unicode: true,
            quiet: false,
            mode: OutputMode::Pretty,
        }
    }

    #[test]
    fn test_kv_plain_is_snake_case() {
        assert_eq!(kv(&plain_ctx(), "Old Fingerprint", "ab"), "old_fingerprint=ab");
    }

    #[test]
    fn test_receipt_plain() {
        let out = receipt(&plain_ctx(), "Encrypted", &[("Files", "2".to_string())]);
        assert_eq!(out, "status=ok\nfiles=2");
    }

    #[test]
    fn test_error_message_plain_with_hint() {
        let out = error_message(&plain_ctx(), "boom", Some("Hint: try again"));
        assert_eq!(out, "error=boom\nhint=try again");
    }

    #[test]
    fn test_table_pretty_has_headers() {
        let out = table(
            &pretty_ctx(),
            &["File", "Status"],
            &[vec!["rules-index".to_string(), "ok".to_string()]],
        );
        assert!(out.contains("File"));
        assert!(out.contains("rules-index"));
    }

    #[test]
    fn test_table_plain_rows() {
        let out = table(
            &plain_ctx(),
            &["File", "Status"],
            &[vec!["a".to_string(), "ok".to_string()]],
        );
        assert_eq!(out, "a ok");
    }
}
