use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use super::client::*;
use crate::errors::AuditError;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotUser {
    pub username: String,
    #[serde(default)]
    pub mfa_devices: usize,
}

/// A previously captured account inventory. Missing sections are empty listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub buckets: Vec<BucketRecord>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupRecord>,
    #[serde(default)]
    pub users: Vec<SnapshotUser>,
    #[serde(default)]
    pub databases: Vec<DatabaseRecord>,
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,
}

/// Serves listings from an inventory file for offline, reproducible audits.
pub struct SnapshotProvider {
    snapshot: InventorySnapshot,
}

impl SnapshotProvider {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a YAML or JSON inventory file. YAML is a superset of JSON, so one parser covers both.
    /// An unreadable or malformed file means the provider cannot be built.
    pub async fn load(path: &Path) -> Result<Self, AuditError> {
        if !path.exists() {
            return Err(AuditError::Provider(format!("Snapshot file not found: {}", path.display())));
        }
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AuditError::Provider(format!("Failed to read snapshot {}: {}", path.display(), e))
        })?;
        let snapshot: InventorySnapshot = serde_yaml::from_str(&content).map_err(|e| {
            AuditError::Provider(format!("Invalid snapshot {}: {}", path.display(), e))
        })?;
        info!(
            path = %path.display(),
            buckets = snapshot.buckets.len(),
            security_groups = snapshot.security_groups.len(),
            users = snapshot.users.len(),
            databases = snapshot.databases.len(),
            functions = snapshot.functions.len(),
            "Loaded inventory snapshot"
        );
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &InventorySnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl CloudProvider for SnapshotProvider {
    async fn list_storage_buckets(&self) -> Result<Vec<BucketRecord>, ProviderError> {
        Ok(self.snapshot.buckets.clone())
    }

    async fn list_security_groups(&self) -> Result<Vec<SecurityGroupRecord>, ProviderError> {
        Ok(self.snapshot.security_groups.clone())
    }

    async fn list_identities(&self) -> Result<Vec<IdentityRecord>, ProviderError> {
        Ok(self.snapshot.users
            .iter()
            .map(|u| IdentityRecord { username: u.username.clone() })
            .collect())
    }

    async fn count_mfa_devices(&self, username: &str) -> Result<usize, ProviderError> {
        self.snapshot.users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.mfa_devices)
            .ok_or_else(|| ProviderError::call("count MFA devices", format!("no such user: {}", username)))
    }

    async fn list_database_instances(&self) -> Result<Vec<DatabaseRecord>, ProviderError> {
        Ok(self.snapshot.databases.clone())
    }

    async fn list_compute_functions(&self) -> Result<Vec<FunctionRecord>, ProviderError> {
        Ok(self.snapshot.functions.clone())
    }

    fn provider_name(&self) -> &str {
        "snapshot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT_YAML: &str = r#"
region: me-south-1
buckets:
  - name: public-assets
    grants:
      - grantee_uri: http://acs.amazonaws.com/groups/global/AllUsers
        permission: READ
  - name: private-logs
users:
  - username: alice
    mfa_devices: 1
  - username: bob
functions:
  - name: nightly-export
    execution_role: arn:aws:iam::123456789012:role/AdminRole
"#;

    #[tokio::test]
    async fn test_load_yaml_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.yaml");
        std::fs::write(&path, SNAPSHOT_YAML).unwrap();

        let provider = SnapshotProvider::load(&path).await.unwrap();
        assert_eq!(provider.snapshot().region.as_deref(), Some("me-south-1"));

        let buckets = provider.list_storage_buckets().await.unwrap();
        assert_eq!(buckets.len(), 2);
        assert!(buckets[0].grants[0].is_all_users());
        assert!(buckets[1].grants.is_empty());

        assert!(provider.list_security_groups().await.unwrap().is_empty());
        assert!(provider.list_database_instances().await.unwrap().is_empty());
        assert_eq!(provider.list_compute_functions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mfa_counts_from_snapshot() {
        let snapshot: InventorySnapshot = serde_yaml::from_str(SNAPSHOT_YAML).unwrap();
        let provider = SnapshotProvider::new(snapshot);
        assert_eq!(provider.count_mfa_devices("alice").await.unwrap(), 1);
        assert_eq!(provider.count_mfa_devices("bob").await.unwrap(), 0);
        assert!(provider.count_mfa_devices("mallory").await.is_err());
    }

    #[tokio::test]
    async fn test_load_json_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(
            &path,
            r#"{"databases": [{"identifier": "orders", "publicly_accessible": true}]}"#,
        ).unwrap();
        let provider = SnapshotProvider::load(&path).await.unwrap();
        let dbs = provider.list_database_instances().await.unwrap();
        assert_eq!(dbs.len(), 1);
        assert!(dbs[0].publicly_accessible);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_provider_error() {
        let err = SnapshotProvider::load(Path::new("/nonexistent/inventory.yaml")).await;
        assert!(matches!(err, Err(AuditError::Provider(_))));
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_provider_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.yaml");
        std::fs::write(&path, "buckets: {not: [a list\n").unwrap();

        let err = SnapshotProvider::load(&path).await.err().unwrap();
        assert!(matches!(err, AuditError::Provider(ref msg) if msg.contains("inventory.yaml")));
        assert_eq!(err.exit_code(), 3);
    }
}
