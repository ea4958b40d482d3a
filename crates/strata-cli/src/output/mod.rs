//! JSON output for `--json` mode.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Envelope wrapping every JSON report.
#[derive(Debug, Serialize)]
pub struct Report<'a, T: Serialize> {
    pub command: &'a str,
    pub ok: bool,
    pub checked_at: String,
    pub data_dir: String,
    pub result: T,
}

impl<'a, T: Serialize> Report<'a, T> {
    pub fn new(command: &'a str, ok: bool, data_dir: String, result: T) -> Self {
        Self {
            command,
            ok,
            checked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            data_dir,
            result,
        }
    }
}

pub fn print_json<T: Serialize>(report: &Report<'_, T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_shape() {
        let report = Report::new("verify", true, "/data".to_string(), vec![1, 2]);
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["command"], "verify");
        assert_eq!(value["ok"], true);
        assert_eq!(value["result"], serde_json::json!([1, 2]));
        assert!(value["checked_at"].as_str().expect("timestamp").ends_with('Z'));
    }
}
