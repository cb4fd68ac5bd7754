//! Audit checks. Each check covers one service category: it lists resources
//! through the provider facade, applies a pure predicate per resource and
//! reports every flagged resource as a [`Finding`].
//!
//! A check is all-or-nothing. Any facade error voids the findings gathered so
//! far and the check reports `Failed` for its category.

pub mod storage;
pub mod network;
pub mod identity;
pub mod database;
pub mod compute;
pub mod registry;

use async_trait::async_trait;
use crate::models::{Category, CheckOutcome, Finding};
use crate::provider::{CloudProvider, ProviderError};

pub use registry::CheckRegistry;
pub use storage::StorageExposureCheck;
pub use network::NetworkExposureCheck;
pub use identity::IdentityMfaCheck;
pub use database::DatabaseExposureCheck;
pub use compute::ComputeRoleCheck;

#[async_trait]
pub trait Check: Send + Sync {
    fn category(&self) -> Category;

    /// Name shown in progress output ("Storage exposure", etc.)
    fn display_name(&self) -> &'static str;

    /// Examine every resource of this category, preserving the provider's listing order.
    async fn collect(&self, provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError>;

    /// Run the check, turning any provider failure into a `Failed` outcome.
    async fn run(&self, provider: &dyn CloudProvider) -> CheckOutcome {
        match self.collect(provider).await {
            Ok(findings) => CheckOutcome::success(findings),
            Err(e) => CheckOutcome::failed(self.category(), e.to_string()),
        }
    }
}
