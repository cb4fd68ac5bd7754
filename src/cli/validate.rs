use std::path::PathBuf;

use crate::cli::commands::ValidateArgs;
use crate::config::{self, ConfigOverrides};
use crate::errors::AuditError;

/// Parse and resolve a config file without contacting any provider.
pub async fn handle_validate(args: ValidateArgs) -> Result<(), AuditError> {
    let path = PathBuf::from(&args.config);
    let parsed = config::parse_config(&path).await?;
    let resolved = config::resolve(&parsed, &ConfigOverrides::default())?;
    println!(
        "Configuration is valid: {} ({} provider, region {}, {} checks)",
        args.config,
        resolved.provider.kind,
        resolved.provider.region,
        resolved.checks.len()
    );
    Ok(())
}
