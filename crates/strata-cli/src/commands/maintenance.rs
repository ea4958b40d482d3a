use secrecy::ExposeSecret;

use strata_core::maintenance::{MigrationStatus, VerifyReport};
use strata_core::{re_encrypt, verify, Domain};

use crate::app::{resolve_passphrase, AppContext};
use crate::cli::{KeyArgs, VerifyArgs};
use crate::errors::{from_core, CliError};
use crate::output::{print_json, Report};
use crate::ui::{badge, header, hint, print, receipt, table, Badge};

pub fn handle_re_encrypt(ctx: &AppContext, args: &KeyArgs) -> anyhow::Result<()> {
    let passphrase = resolve_passphrase(args.key.as_deref(), Domain::Local)?;
    let report =
        re_encrypt(&ctx.data_dir, passphrase.expose_secret(), ctx.format).map_err(from_core)?;
    let failed = report
        .outcomes
        .iter()
        .filter(|o| o.status == MigrationStatus::Failed)
        .count();

    if ctx.ui.mode.is_json() {
        print_json(&Report::new(
            "re-encrypt",
            report.ok(),
            ctx.data_dir_display(),
            &report,
        ))?;
    } else {
        print(&ctx.ui, &header(&ctx.ui, "re-encrypt", Some(&ctx.data_dir_display())));
        let rows: Vec<Vec<String>> = report
            .outcomes
            .iter()
            .map(|o| {
                let status = match o.status {
                    MigrationStatus::Migrated => "migrated",
                    MigrationStatus::Skipped => "skipped",
                    MigrationStatus::Failed => "FAILED",
                };
                vec![
                    o.name.clone(),
                    status.to_string(),
                    format!(
                        "{} -> {}",
                        o.from.map(|f| f.to_string()).unwrap_or_else(|| "-".into()),
                        o.to.map(|f| f.to_string()).unwrap_or_else(|| "-".into()),
                    ),
                    short(o.old_fingerprint.as_deref()),
                    short(o.new_fingerprint.as_deref()),
                ]
            })
            .collect();
        print(
            &ctx.ui,
            &table(&ctx.ui, &["File", "Status", "Format", "Old", "New"], &rows),
        );
        for outcome in report.outcomes.iter().filter(|o| o.error.is_some()) {
            print(
                &ctx.ui,
                &badge(
                    &ctx.ui,
                    Badge::Err,
                    &format!(
                        "{}: {}",
                        outcome.name,
                        outcome.error.as_deref().unwrap_or_default()
                    ),
                ),
            );
        }
        if report.ok() {
            print(
                &ctx.ui,
                &receipt(
                    &ctx.ui,
                    "Re-encrypted",
                    &[
                        ("Files", report.migrated().to_string()),
                        ("Format", report.format.to_string()),
                    ],
                ),
            );
        }
    }

    if failed > 0 {
        return Err(CliError::check_failed("re-encrypt", failed).into());
    }
    Ok(())
}

pub fn handle_verify(ctx: &AppContext, args: &VerifyArgs) -> anyhow::Result<()> {
    let passphrase = resolve_passphrase(args.key.key.as_deref(), Domain::Local)?;
    let dist = args.dist_key.as_deref().filter(|v| !v.trim().is_empty());
    let report = verify(&ctx.data_dir, passphrase.expose_secret(), dist).map_err(from_core)?;

    if ctx.ui.mode.is_json() {
        print_json(&Report::new(
            "verify",
            report.ok(),
            ctx.data_dir_display(),
            &report,
        ))?;
    } else {
        render_verify(ctx, &report);
    }

    if !report.ok() {
        return Err(CliError::check_failed("verify", report.issue_count()).into());
    }
    Ok(())
}

fn render_verify(ctx: &AppContext, report: &VerifyReport) {
    print(&ctx.ui, &header(&ctx.ui, "verify", Some(&ctx.data_dir_display())));

    let mut rows = Vec::new();
    for file in &report.files {
        let format = file
            .format
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        if file.issues.is_empty() && file.advisories.is_empty() {
            rows.push(vec![file.name.clone(), "ok".to_string(), format.clone(), String::new()]);
        }
        for issue in &file.issues {
            rows.push(vec![
                file.name.clone(),
                "FAIL".to_string(),
                format.clone(),
                issue.message(),
            ]);
        }
        for advisory in &file.advisories {
            rows.push(vec![
                file.name.clone(),
                "advice".to_string(),
                format.clone(),
                advisory.message(),
            ]);
        }
    }
    print(
        &ctx.ui,
        &table(&ctx.ui, &["File", "Status", "Format", "Detail"], &rows),
    );

    if report.ok() {
        print(&ctx.ui, &badge(&ctx.ui, Badge::Ok, "All checks passed"));
    } else {
        print(
            &ctx.ui,
            &hint(&ctx.ui, "Remove leaked plaintext after encrypting, or re-run encrypt-local."),
        );
    }
}

fn short(fingerprint: Option<&str>) -> String {
    fingerprint
        .map(|f| f.chars().take(12).collect())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_fingerprint() {
        assert_eq!(short(Some("0123456789abcdef")), "0123456789ab");
        assert_eq!(short(None), "-");
    }
}
