use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AuditError;
use crate::models::Category;
use crate::pipeline::{ExecutionMode, RunConfig, DEFAULT_MAX_CONCURRENCY};
use crate::provider::{ProviderKind, ProviderSettings};
use crate::reporting::OutputFormat;
use super::credentials::resolve_aws_credentials;
use super::parser::parse_check_names;
use super::types::*;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Implies the snapshot provider.
    pub snapshot: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub sequential: bool,
    pub max_concurrency: Option<usize>,
    pub checks: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub formats: Option<Vec<OutputFormat>>,
}

/// Everything one audit run needs, with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: ProviderSettings,
    pub run: RunConfig,
    pub checks: Vec<Category>,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
}

pub fn resolve(config: &AuditConfig, overrides: &ConfigOverrides) -> Result<ResolvedConfig, AuditError> {
    let provider_cfg = config.provider.clone().unwrap_or_default();
    let audit_cfg = config.audit.clone().unwrap_or_default();
    let output_cfg = config.output.clone().unwrap_or_default();

    let snapshot_path = overrides
        .snapshot
        .clone()
        .or_else(|| provider_cfg.snapshot_path.as_ref().map(PathBuf::from));
    let kind = if overrides.snapshot.is_some() {
        ProviderKind::Snapshot
    } else {
        provider_cfg.kind.unwrap_or_default()
    };
    if kind == ProviderKind::Snapshot && snapshot_path.is_none() {
        return Err(AuditError::Config("snapshot provider requires a snapshot path".into()));
    }

    let region = overrides
        .region
        .clone()
        .or(provider_cfg.region)
        .unwrap_or_else(|| DEFAULT_REGION.to_string());
    if region.trim().is_empty() {
        return Err(AuditError::InvalidArgument("region must not be empty".into()));
    }

    let timeout_secs = overrides
        .timeout_secs
        .or(provider_cfg.call_timeout_secs)
        .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(AuditError::InvalidArgument("timeout must be at least 1 second".into()));
    }

    let credentials = match kind {
        ProviderKind::AwsCli => resolve_aws_credentials(
            provider_cfg.access_key_id.as_deref(),
            provider_cfg.secret_access_key.as_deref(),
            provider_cfg.session_token.as_deref(),
        )?,
        ProviderKind::Snapshot => None,
    };

    let provider = ProviderSettings {
        kind,
        region,
        profile: overrides.profile.clone().or(provider_cfg.profile),
        credentials,
        cli_path: provider_cfg.cli_path.unwrap_or_else(|| DEFAULT_CLI_PATH.to_string()),
        snapshot_path,
        call_timeout: Duration::from_secs(timeout_secs),
    };

    let max_concurrency = overrides
        .max_concurrency
        .or(audit_cfg.max_concurrency)
        .unwrap_or(DEFAULT_MAX_CONCURRENCY);
    if max_concurrency == 0 {
        return Err(AuditError::InvalidArgument("max concurrency must be at least 1".into()));
    }
    let mode = if overrides.sequential {
        ExecutionMode::Sequential
    } else {
        audit_cfg.execution.unwrap_or_default()
    };
    let run = match mode {
        ExecutionMode::Sequential => RunConfig::sequential(),
        ExecutionMode::Parallel => RunConfig::parallel(max_concurrency),
    };

    let checks = match overrides.checks.as_ref().or(audit_cfg.checks.as_ref()) {
        Some(names) => parse_check_names(names)?,
        None => Category::ALL.to_vec(),
    };

    let output_dir = overrides
        .output
        .clone()
        .or_else(|| output_cfg.directory.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let formats = overrides
        .formats
        .clone()
        .or(output_cfg.formats)
        .unwrap_or_else(|| OutputFormat::DEFAULT.to_vec());
    if formats.is_empty() {
        return Err(AuditError::InvalidArgument("at least one output format is required".into()));
    }

    Ok(ResolvedConfig { provider, run, checks, output_dir, formats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_config_str;

    fn snapshot_overrides() -> ConfigOverrides {
        ConfigOverrides {
            snapshot: Some(PathBuf::from("inventory.yaml")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let resolved = resolve(&AuditConfig::default(), &snapshot_overrides()).unwrap();
        assert_eq!(resolved.provider.region, DEFAULT_REGION);
        assert_eq!(resolved.provider.call_timeout, Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS));
        assert_eq!(resolved.run, RunConfig::default());
        assert_eq!(resolved.checks, Category::ALL.to_vec());
        assert_eq!(resolved.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(resolved.formats, OutputFormat::DEFAULT.to_vec());
    }

    #[test]
    fn test_snapshot_flag_selects_snapshot_provider() {
        let resolved = resolve(&AuditConfig::default(), &snapshot_overrides()).unwrap();
        assert_eq!(resolved.provider.kind, ProviderKind::Snapshot);
        assert!(resolved.provider.credentials.is_none());
    }

    #[test]
    fn test_overrides_beat_file_values() {
        let config = parse_config_str(
            "provider:\n  region: eu-west-1\n  call_timeout_secs: 5\naudit:\n  checks: [s3]\n  max_concurrency: 2\n",
        )
        .unwrap();
        let overrides = ConfigOverrides {
            region: Some("us-east-2".into()),
            sequential: true,
            checks: Some(vec!["iam".into(), "rds".into()]),
            formats: Some(vec![OutputFormat::Terminal]),
            ..snapshot_overrides()
        };
        let resolved = resolve(&config, &overrides).unwrap();
        assert_eq!(resolved.provider.region, "us-east-2");
        assert_eq!(resolved.provider.call_timeout, Duration::from_secs(5));
        assert_eq!(resolved.run, RunConfig::sequential());
        assert_eq!(resolved.checks, vec![Category::Identity, Category::Database]);
        assert_eq!(resolved.formats, vec![OutputFormat::Terminal]);
    }

    #[test]
    fn test_file_concurrency_is_used_in_parallel_mode() {
        let config = parse_config_str("audit:\n  max_concurrency: 2\n").unwrap();
        let resolved = resolve(&config, &snapshot_overrides()).unwrap();
        assert_eq!(resolved.run.width(), 2);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let zero_timeout = ConfigOverrides { timeout_secs: Some(0), ..snapshot_overrides() };
        assert!(matches!(
            resolve(&AuditConfig::default(), &zero_timeout),
            Err(AuditError::InvalidArgument(_))
        ));

        let bad_check = ConfigOverrides { checks: Some(vec!["dns".into()]), ..snapshot_overrides() };
        assert!(resolve(&AuditConfig::default(), &bad_check).is_err());
    }
}
