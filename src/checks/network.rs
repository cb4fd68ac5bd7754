use async_trait::async_trait;
use crate::models::{Category, Finding, Reason};
use crate::provider::{CloudProvider, InboundRule, ProviderError, SecurityGroupRecord, ANY_IPV4};
use super::Check;
use tracing::debug;

/// Flags security groups with any inbound rule open to `0.0.0.0/0`, on any port.
pub struct NetworkExposureCheck;

/// Inbound rules whose source is exactly `0.0.0.0/0`. Narrower ranges never match.
pub fn open_rules(group: &SecurityGroupRecord) -> Vec<&InboundRule> {
    group.inbound_rules
        .iter()
        .filter(|r| r.source_cidr == ANY_IPV4)
        .collect()
}

pub fn is_open_group(group: &SecurityGroupRecord) -> bool {
    group.inbound_rules.iter().any(|r| r.source_cidr == ANY_IPV4)
}

#[async_trait]
impl Check for NetworkExposureCheck {
    fn category(&self) -> Category {
        Category::Network
    }

    fn display_name(&self) -> &'static str {
        "Network exposure"
    }

    async fn collect(&self, provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError> {
        let groups = provider.list_security_groups().await?;
        debug!(groups = groups.len(), "Evaluating inbound rules");

        Ok(groups
            .iter()
            .filter(|g| is_open_group(g))
            .map(|g| {
                let mut ports: Vec<String> = Vec::new();
                for rule in open_rules(g) {
                    let range = rule.port_range();
                    if !ports.contains(&range) {
                        ports.push(range);
                    }
                }
                let detail = match &g.group_id {
                    Some(id) => format!("{} open to {}: {}", id, ANY_IPV4, ports.join(", ")),
                    None => format!("open to {}: {}", ANY_IPV4, ports.join(", ")),
                };
                Finding::new(Category::Network, &g.name, Reason::OpenIngress).with_detail(detail)
            })
            .collect())
    }
}
