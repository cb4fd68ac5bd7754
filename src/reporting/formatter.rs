use std::fmt::Write as FmtWrite;

use console::style;
use crate::models::{CheckOutcome, Report};

/// Plain-terminal summary printed at the end of a run.
///
/// Colors follow `console`'s global switch, so `--no-color` and non-tty
/// output get plain text.
pub fn format_terminal_summary(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({})",
        style("Cloud Security Audit").bold(),
        style(&report.context.region).cyan(),
        style(&report.context.provider).dim(),
    );
    let _ = writeln!(out, "{}", style("-".repeat(52)).dim());

    for (category, outcome) in &report.outcomes {
        let label = format!("{:<7} {:<24}", category.service_label(), category.finding_label());
        match outcome {
            CheckOutcome::Success { findings } if findings.is_empty() => {
                let _ = writeln!(out, "  {} {} {}", style("\u{2714}").green(), label, style("0").green());
            }
            CheckOutcome::Success { findings } => {
                let _ = writeln!(
                    out,
                    "  {} {} {}",
                    style("\u{2716}").red(),
                    label,
                    style(findings.len()).red().bold()
                );
                for finding in findings {
                    let _ = writeln!(
                        out,
                        "      {} {}",
                        finding.resource,
                        style(finding.detail.as_deref().unwrap_or(finding.reason.label())).dim()
                    );
                }
            }
            CheckOutcome::Failed { error } => {
                let _ = writeln!(
                    out,
                    "  {} {} {} {}",
                    style("!").yellow().bold(),
                    label,
                    style("error").yellow(),
                    style(&error.cause).dim()
                );
            }
        }
    }

    let _ = writeln!(out, "{}", style("-".repeat(52)).dim());
    let _ = write!(
        out,
        "  {} findings across {} checks",
        style(report.summary.total_findings).bold(),
        report.outcomes.len()
    );
    if report.has_failures() {
        let _ = write!(out, ", {} {}", style(report.summary.failed_checks).yellow().bold(), "failed");
    }
    out.push('\n');
    out
}

pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Finding, Reason, ReportContext};
    use crate::reporting::aggregator::ReportAggregator;

    #[test]
    fn test_summary_lists_findings_and_failures() {
        console::set_colors_enabled(false);
        let report = ReportAggregator::new(ReportContext {
            region: "eu-west-1".into(),
            provider: "snapshot".into(),
            tool_version: "1.0.0".into(),
        })
        .aggregate(vec![
            (Category::Storage, CheckOutcome::success(vec![
                Finding::new(Category::Storage, "public-assets", Reason::PublicAccess),
            ])),
            (Category::Network, CheckOutcome::success(vec![])),
            (Category::Identity, CheckOutcome::failed(Category::Identity, "AccessDenied")),
        ]);

        let text = format_terminal_summary(&report);
        assert!(text.contains("eu-west-1"));
        assert!(text.contains("public-assets"));
        assert!(text.contains("AccessDenied"));
        assert!(text.contains("1 findings across 3 checks, 1 failed"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }
}
