use std::path::{Path, PathBuf};

use crate::cli::commands::RenderArgs;
use crate::cli::run::parse_formats;
use crate::errors::AuditError;
use crate::reporting::{load_report, write_reports};
use tracing::info;

/// Re-render a saved report without touching the cloud account.
pub async fn handle_render(args: RenderArgs, quiet: bool) -> Result<(), AuditError> {
    let report_path = PathBuf::from(&args.report);
    let report = load_report(&report_path).await?;
    let formats = parse_formats(&args.format)?;

    let output_dir = match &args.output {
        Some(dir) => PathBuf::from(dir),
        None => report_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let written = write_reports(&report, &output_dir, &formats).await?;
    info!(run_id = %report.run_id, files = written.files.len(), "Report re-rendered");

    if let Some(summary) = &written.terminal {
        print!("{}", summary);
    }
    if !quiet {
        for path in &written.files {
            println!("Report written: {}", path.display());
        }
    }
    Ok(())
}
