use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use crate::errors::AuditError;
use super::aws_cli::{AwsCliProvider, AwsCliSettings, AwsCredentials};
use super::client::CloudProvider;
use super::snapshot::SnapshotProvider;
use super::timeout::TimeoutProvider;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    #[default]
    AwsCli,
    Snapshot,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsCli => "aws-cli",
            Self::Snapshot => "snapshot",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved facade configuration for one audit run.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub region: String,
    pub profile: Option<String>,
    pub credentials: Option<AwsCredentials>,
    pub cli_path: String,
    pub snapshot_path: Option<PathBuf>,
    pub call_timeout: Duration,
}

/// Build the configured provider. The AWS CLI provider bounds each child process
/// itself; the snapshot provider sits behind the per-call timeout decorator.
pub async fn create_provider(settings: &ProviderSettings) -> Result<Arc<dyn CloudProvider>, AuditError> {
    info!(
        provider = %settings.kind,
        region = %settings.region,
        timeout_secs = settings.call_timeout.as_secs(),
        "Creating cloud provider"
    );

    match settings.kind {
        ProviderKind::AwsCli => {
            let inner = AwsCliProvider::new(AwsCliSettings {
                cli_path: settings.cli_path.clone(),
                region: settings.region.clone(),
                profile: settings.profile.clone(),
                credentials: settings.credentials.clone(),
                call_timeout: settings.call_timeout,
            });
            Ok(Arc::new(inner))
        }
        ProviderKind::Snapshot => {
            let path = settings.snapshot_path.as_ref().ok_or_else(|| {
                AuditError::Config("snapshot provider requires a snapshot path".into())
            })?;
            let inner = SnapshotProvider::load(path).await?;
            Ok(Arc::new(TimeoutProvider::new(inner, settings.call_timeout)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: ProviderKind) -> ProviderSettings {
        ProviderSettings {
            kind,
            region: "me-south-1".into(),
            profile: None,
            credentials: None,
            cli_path: "aws".into(),
            snapshot_path: None,
            call_timeout: Duration::from_secs(30),
        }
    }

    #[tokio::test]
    async fn test_create_aws_cli_provider() {
        let provider = create_provider(&settings(ProviderKind::AwsCli)).await.unwrap();
        assert_eq!(provider.provider_name(), "aws-cli");
    }

    #[tokio::test]
    async fn test_snapshot_without_path_is_rejected() {
        let result = create_provider(&settings(ProviderKind::Snapshot)).await;
        assert!(matches!(result, Err(AuditError::Config(_))));
    }

    #[test]
    fn test_provider_kind_serialization() {
        assert_eq!(serde_json::to_string(&ProviderKind::AwsCli).unwrap(), "\"aws-cli\"");
        let parsed: ProviderKind = serde_json::from_str("\"snapshot\"").unwrap();
        assert_eq!(parsed, ProviderKind::Snapshot);
        assert_eq!(ProviderKind::default(), ProviderKind::AwsCli);
    }
}
