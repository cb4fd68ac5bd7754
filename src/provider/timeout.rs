use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use super::client::*;
use tracing::warn;

/// Bound a single facade call. An elapsed deadline becomes `ProviderError::Timeout`
/// and the in-flight future is dropped.
pub async fn call_with_timeout<T, F>(
    operation: &str,
    limit: Duration,
    call: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_secs = limit.as_secs(), "Provider call timed out");
            Err(ProviderError::Timeout {
                operation: operation.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}

/// Applies the same per-call deadline to every operation of the wrapped provider,
/// so an unresponsive endpoint fails its check instead of stalling the run.
pub struct TimeoutProvider<P> {
    inner: P,
    limit: Duration,
}

impl<P: CloudProvider> TimeoutProvider<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<P: CloudProvider> CloudProvider for TimeoutProvider<P> {
    async fn list_storage_buckets(&self) -> Result<Vec<BucketRecord>, ProviderError> {
        call_with_timeout("list storage buckets", self.limit, self.inner.list_storage_buckets()).await
    }

    async fn list_security_groups(&self) -> Result<Vec<SecurityGroupRecord>, ProviderError> {
        call_with_timeout("list security groups", self.limit, self.inner.list_security_groups()).await
    }

    async fn list_identities(&self) -> Result<Vec<IdentityRecord>, ProviderError> {
        call_with_timeout("list identities", self.limit, self.inner.list_identities()).await
    }

    async fn count_mfa_devices(&self, username: &str) -> Result<usize, ProviderError> {
        call_with_timeout("count MFA devices", self.limit, self.inner.count_mfa_devices(username)).await
    }

    async fn list_database_instances(&self) -> Result<Vec<DatabaseRecord>, ProviderError> {
        call_with_timeout("list database instances", self.limit, self.inner.list_database_instances()).await
    }

    async fn list_compute_functions(&self) -> Result<Vec<FunctionRecord>, ProviderError> {
        call_with_timeout("list compute functions", self.limit, self.inner.list_compute_functions()).await
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
