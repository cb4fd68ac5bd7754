use std::path::PathBuf;

use crate::cli::commands::SystemArgs;
use crate::errors::AuditError;
use crate::inventory::{collect_system_report, write_system_report};

pub async fn handle_system(args: SystemArgs, quiet: bool) -> Result<(), AuditError> {
    let report = collect_system_report().await;
    let path = PathBuf::from(&args.output);
    write_system_report(&report, &path).await?;
    if !quiet {
        println!("System audit completed. Report saved to {}", path.display());
    }
    Ok(())
}
