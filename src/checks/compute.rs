use async_trait::async_trait;
use crate::models::{Category, Finding, Reason};
use crate::provider::{CloudProvider, FunctionRecord, ProviderError};
use super::Check;

/// Literal marker searched for in execution role identifiers.
pub const PRIVILEGED_ROLE_MARKER: &str = "Admin";

/// Flags serverless functions whose execution role name suggests admin privileges.
///
/// This is a coarse naming heuristic: a case-sensitive substring match on the
/// role ARN, not an evaluation of the role's attached policies.
pub struct ComputeRoleCheck;

pub fn has_privileged_role(function: &FunctionRecord) -> bool {
    function.execution_role.contains(PRIVILEGED_ROLE_MARKER)
}

#[async_trait]
impl Check for ComputeRoleCheck {
    fn category(&self) -> Category {
        Category::Compute
    }

    fn display_name(&self) -> &'static str {
        "Compute role risk"
    }

    async fn collect(&self, provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError> {
        let functions = provider.list_compute_functions().await?;
        Ok(functions
            .iter()
            .filter(|f| has_privileged_role(f))
            .map(|f| {
                Finding::new(Category::Compute, &f.name, Reason::PrivilegedRole)
                    .with_detail(format!("execution role {}", f.execution_role))
            })
            .collect())
    }
}
