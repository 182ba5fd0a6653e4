//! Report renderers and notice sinks for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use zapauth_core::{AuthOutcome, AuthReport, Notice, NoticeSink, StdoutNotices, UserCredential};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Writes notices to stderr so stdout stays machine-readable.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StderrNotices;

impl NoticeSink for StderrNotices {
    fn emit(&self, notice: &Notice) {
        eprintln!("{notice}");
    }
}

/// Notices share stdout with the table report but move to stderr for JSON.
pub(crate) fn notice_sink(format: OutputFormat) -> Box<dyn NoticeSink> {
    match format {
        OutputFormat::Table => Box::new(StdoutNotices),
        OutputFormat::Json => Box::new(StderrNotices),
    }
}

pub(crate) fn render_report(report: &AuthReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(report)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => print!("{}", format_report_table(report)),
    }
    Ok(())
}

pub(crate) fn render_roster(roster: &[UserCredential], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = roster
                .iter()
                .map(|user| {
                    serde_json::json!({
                        "name": user.name,
                        "username": user.username,
                        "role": user.role.as_str(),
                        "session": user.session_name(),
                        "rule": user.rule_name(),
                    })
                })
                .collect();
            let text = serde_json::to_string_pretty(&entries)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            println!("{:<16} {:<20} ROLE", "NAME", "USERNAME");
            for user in roster {
                println!("{:<16} {:<20} {}", user.name, user.username, user.role);
            }
        }
    }
    Ok(())
}

pub(crate) fn format_report_table(report: &AuthReport) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{:<16} {:<14} DETAIL", "USER", "OUTCOME");
    for entry in &report.users {
        let (outcome, detail) = describe_outcome(&entry.outcome);
        let _ = writeln!(text, "{:<16} {outcome:<14} {detail}", entry.label);
    }
    let _ = writeln!(
        text,
        "context: {} | authenticated: {} | failed: {}",
        report.context_id.as_deref().unwrap_or("-"),
        report.succeeded(),
        report.failed()
    );
    text
}

fn describe_outcome(outcome: &AuthOutcome) -> (&'static str, String) {
    match outcome {
        AuthOutcome::Authenticated { role } => ("authenticated", role.to_string()),
        AuthOutcome::Rejected { status } => ("rejected", format!("status {status}")),
        AuthOutcome::Errored { message } => ("errored", message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zapauth_core::Role;

    #[test]
    fn report_table_lists_each_user_and_totals() {
        let mut report = AuthReport {
            context_id: Some("1".into()),
            users: Vec::new(),
        };
        report.record("test-customer", AuthOutcome::Authenticated { role: Role::Customer });
        report.record("test-merchant", AuthOutcome::Rejected { status: 401 });
        report.record(
            "test-driver",
            AuthOutcome::Errored {
                message: "login failed: login request failed".into(),
            },
        );

        let table = format_report_table(&report);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("test-customer"));
        assert!(lines[1].ends_with("CUSTOMER"));
        assert!(lines[2].contains("rejected") && lines[2].ends_with("status 401"));
        assert!(lines[3].contains("errored"));
        assert_eq!(lines[4], "context: 1 | authenticated: 1 | failed: 2");
    }
}
