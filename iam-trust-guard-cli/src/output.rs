use anyhow::{Context, Result};
use iam_trust_guard_analysis::{AuditReport, JsonProvider, RiskLevel, ValidationReport};
use log::debug;
use serde::Serialize;
use std::io::{self, Write};

pub(crate) fn note(msg: &str) {
    let _ = writeln!(io::stderr(), "iam-trust-guard: {}", msg);
}

pub(crate) fn error(msg: &str) {
    let _ = writeln!(io::stderr(), "iam-trust-guard (error): {}", msg);
}

/// One line per finding on stdout, grouped by role in audit order.
pub(crate) fn print_findings(report: &AuditReport) {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    for role in &report.roles {
        for finding in &role.findings {
            let _ = writeln!(
                w,
                "[{:<6}] {}: {}",
                finding.risk, finding.role, finding.reason
            );
        }
    }
}

/// Per-risk totals of an audit. Taken before `--min-risk` hides anything.
pub(crate) fn audit_summary(report: &AuditReport) -> String {
    let counts = RiskLevel::ALL
        .iter()
        .rev()
        .map(|risk| format!("{} {}", report.count_by_risk(*risk), risk))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "audited {} role(s) in account {}: {}",
        report.roles.len(),
        report.account_id,
        counts
    )
}

/// Numbered validation report on stdout.
pub(crate) fn print_validation_report(report: &ValidationReport) {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    let _ = writeln!(w, "{}", report.summary());
    for (i, error) in report.errors().iter().enumerate() {
        let _ = writeln!(w, "{}. Location: {}", i + 1, error.location);
        let _ = writeln!(w, "   Error: {}", error.message);
    }
}

/// Validation result as emitted with `--json`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ValidationOutput<'a> {
    valid: bool,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

pub(crate) fn output_validation_json(report: &ValidationReport, pretty: bool) -> Result<()> {
    output_json(
        &ValidationOutput {
            valid: report.is_valid(),
            report,
        },
        pretty,
    )
}

/// Output a serializable value as JSON to stdout
pub(crate) fn output_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    debug!("Formatting output as JSON (pretty: {})", pretty);

    let json_output = if pretty {
        JsonProvider::stringify_pretty(value).context("Failed to serialize output to pretty JSON")?
    } else {
        JsonProvider::stringify(value).context("Failed to serialize output to JSON")?
    };

    // Output to stdout (not using println! to avoid extra newline in compact mode)
    print!("{}", json_output);
    if pretty {
        println!();
    }
    Ok(())
}
