use async_trait::async_trait;
use crate::models::{Category, Finding, Reason};
use crate::provider::{CloudProvider, ProviderError};
use super::Check;
use tracing::debug;

/// Flags user identities with no registered multi-factor device.
pub struct IdentityMfaCheck;

pub fn lacks_mfa(mfa_devices: usize) -> bool {
    mfa_devices == 0
}

#[async_trait]
impl Check for IdentityMfaCheck {
    fn category(&self) -> Category {
        Category::Identity
    }

    fn display_name(&self) -> &'static str {
        "Identity MFA"
    }

    async fn collect(&self, provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError> {
        let users = provider.list_identities().await?;
        debug!(users = users.len(), "Counting MFA devices");

        let mut findings = Vec::new();
        for user in &users {
            // One failed lookup voids the whole check
            let devices = provider.count_mfa_devices(&user.username).await?;
            if lacks_mfa(devices) {
                findings.push(
                    Finding::new(Category::Identity, &user.username, Reason::NoMfa)
                        .with_detail("0 MFA devices registered"),
                );
            }
        }
        Ok(findings)
    }
}
