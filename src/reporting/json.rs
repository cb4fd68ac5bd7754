use std::path::Path;

use crate::errors::AuditError;
use crate::models::Report;
use tracing::info;

pub const REPORT_FILE_NAME: &str = "cloud_report.json";

pub fn render_json(report: &Report) -> Result<String, AuditError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Load a previously written report, e.g. to re-render the dashboard.
pub async fn load_report(path: &Path) -> Result<Report, AuditError> {
    if !path.exists() {
        return Err(AuditError::InvalidArgument(format!(
            "Report file not found: {}",
            path.display()
        )));
    }
    let content = tokio::fs::read_to_string(path).await?;
    let report: Report = serde_json::from_str(&content).map_err(|e| {
        AuditError::Render(format!("{} is not a valid audit report: {}", path.display(), e))
    })?;
    info!(path = %path.display(), run_id = %report.run_id, "Loaded report");
    Ok(report)
}
