use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use crate::errors::AuditError;
use crate::models::Report;
use super::formatter::format_terminal_summary;
use super::html::{render_html, DASHBOARD_FILE_NAME};
use super::json::{render_json, REPORT_FILE_NAME};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Html,
    Terminal,
}

impl OutputFormat {
    pub const DEFAULT: [OutputFormat; 2] = [OutputFormat::Json, OutputFormat::Html];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            "terminal" | "text" => Some(Self::Terminal),
            _ => None,
        }
    }
}

/// What a call to [`write_reports`] produced.
#[derive(Debug, Default)]
pub struct WrittenReports {
    pub files: Vec<PathBuf>,
    /// Terminal summary, when requested. The caller decides where to print it.
    pub terminal: Option<String>,
}

/// Render the report in every requested format. File outputs land in `dir`,
/// which is created if missing. Rendering never changes the report.
pub async fn write_reports(
    report: &Report,
    dir: &Path,
    formats: &[OutputFormat],
) -> Result<WrittenReports, AuditError> {
    let mut written = WrittenReports::default();
    if formats.iter().any(|f| *f != OutputFormat::Terminal) {
        tokio::fs::create_dir_all(dir).await?;
    }

    for format in formats {
        match format {
            OutputFormat::Json => {
                let path = dir.join(REPORT_FILE_NAME);
                tokio::fs::write(&path, render_json(report)?).await?;
                info!(path = %path.display(), "JSON report written");
                written.files.push(path);
            }
            OutputFormat::Html => {
                let path = dir.join(DASHBOARD_FILE_NAME);
                tokio::fs::write(&path, render_html(report)).await?;
                info!(path = %path.display(), "HTML dashboard written");
                written.files.push(path);
            }
            OutputFormat::Terminal => {
                written.terminal = Some(format_terminal_summary(report));
            }
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CheckOutcome, ReportContext};
    use crate::reporting::aggregator::ReportAggregator;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Terminal));
        assert_eq!(OutputFormat::parse("pdf"), None);
    }

    #[tokio::test]
    async fn test_write_reports_creates_requested_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("results");
        let report = ReportAggregator::new(ReportContext::default())
            .aggregate(vec![(Category::Storage, CheckOutcome::success(vec![]))]);

        let written = write_reports(&report, &out, &OutputFormat::DEFAULT).await.unwrap();
        assert_eq!(written.files.len(), 2);
        assert!(out.join(REPORT_FILE_NAME).exists());
        assert!(out.join(DASHBOARD_FILE_NAME).exists());
        assert!(written.terminal.is_none());
    }

    #[tokio::test]
    async fn test_terminal_only_touches_no_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("unused");
        let report = ReportAggregator::new(ReportContext::default())
            .aggregate(vec![(Category::Compute, CheckOutcome::success(vec![]))]);

        let written = write_reports(&report, &out, &[OutputFormat::Terminal]).await.unwrap();
        assert!(written.files.is_empty());
        assert!(written.terminal.is_some());
        assert!(!out.exists());
    }
}
