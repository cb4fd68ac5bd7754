use async_trait::async_trait;
use crate::models::{Category, Finding, Reason};
use crate::provider::{CloudProvider, DatabaseRecord, ProviderError};
use super::Check;

/// Flags managed database instances marked publicly accessible.
pub struct DatabaseExposureCheck;

pub fn is_public_instance(instance: &DatabaseRecord) -> bool {
    instance.publicly_accessible
}

#[async_trait]
impl Check for DatabaseExposureCheck {
    fn category(&self) -> Category {
        Category::Database
    }

    fn display_name(&self) -> &'static str {
        "Database exposure"
    }

    async fn collect(&self, provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError> {
        let instances = provider.list_database_instances().await?;
        Ok(instances
            .iter()
            .filter(|db| is_public_instance(db))
            .map(|db| {
                let detail = match &db.engine {
                    Some(engine) => format!("{} instance is publicly accessible", engine),
                    None => "instance is publicly accessible".to_string(),
                };
                Finding::new(Category::Database, &db.identifier, Reason::PubliclyAccessible)
                    .with_detail(detail)
            })
            .collect())
    }
}
