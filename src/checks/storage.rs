use async_trait::async_trait;
use crate::models::{Category, Finding, Reason};
use crate::provider::{BucketRecord, CloudProvider, ProviderError};
use super::Check;
use tracing::debug;

/// Flags buckets whose access policy grants anything to the "all users" principal.
pub struct StorageExposureCheck;

/// Permissions granted to the "all users" principal, in grant order.
pub fn public_permissions(bucket: &BucketRecord) -> Vec<&str> {
    let mut perms: Vec<&str> = Vec::new();
    for grant in bucket.grants.iter().filter(|g| g.is_all_users()) {
        if !perms.contains(&grant.permission.as_str()) {
            perms.push(&grant.permission);
        }
    }
    perms
}

pub fn is_public_bucket(bucket: &BucketRecord) -> bool {
    bucket.grants.iter().any(|g| g.is_all_users())
}

#[async_trait]
impl Check for StorageExposureCheck {
    fn category(&self) -> Category {
        Category::Storage
    }

    fn display_name(&self) -> &'static str {
        "Storage exposure"
    }

    async fn collect(&self, provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError> {
        let buckets = provider.list_storage_buckets().await?;
        debug!(buckets = buckets.len(), "Evaluating bucket grants");

        Ok(buckets
            .iter()
            .filter(|b| is_public_bucket(b))
            .map(|b| {
                Finding::new(Category::Storage, &b.name, Reason::PublicAccess)
                    .with_detail(format!("AllUsers granted {}", public_permissions(b).join(", ")))
            })
            .collect())
    }
}
