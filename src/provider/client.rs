use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grantee URI of the reserved "all users" group in bucket access policies.
pub const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// Source range matching every IPv4 address.
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Failure of a single facade call. Every variant turns the calling check into `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{operation} failed: {message}")]
    Call { operation: String, message: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("{operation} returned malformed data: {message}")]
    Malformed { operation: String, message: String },

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn call(operation: &str, message: impl Into<String>) -> Self {
        Self::Call { operation: operation.to_string(), message: message.into() }
    }

    pub fn malformed(operation: &str, message: impl Into<String>) -> Self {
        Self::Malformed { operation: operation.to_string(), message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    #[serde(default)]
    pub grantee_uri: Option<String>,
    #[serde(default)]
    pub grantee_id: Option<String>,
    pub permission: String,
}

impl AccessGrant {
    pub fn is_all_users(&self) -> bool {
        self.grantee_uri.as_deref() == Some(ALL_USERS_URI)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub name: String,
    #[serde(default)]
    pub grants: Vec<AccessGrant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRule {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub from_port: Option<i32>,
    #[serde(default)]
    pub to_port: Option<i32>,
    pub source_cidr: String,
}

fn default_protocol() -> String {
    "-1".to_string()
}

impl InboundRule {
    /// Human readable port range, e.g. "tcp/22" or "all traffic".
    pub fn port_range(&self) -> String {
        if self.protocol == "-1" {
            return "all traffic".to_string();
        }
        match (self.from_port, self.to_port) {
            (Some(from), Some(to)) if from == to => format!("{}/{}", self.protocol, from),
            (Some(from), Some(to)) => format!("{}/{}-{}", self.protocol, from, to),
            _ => format!("{}/any", self.protocol),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRecord {
    #[serde(default)]
    pub group_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub inbound_rules: Vec<InboundRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    pub identifier: String,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub publicly_accessible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub execution_role: String,
}

/// Read-only query surface of one cloud account in one region.
///
/// Implementations return the provider's listing order unchanged; checks rely
/// on it for deterministic findings.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    async fn list_storage_buckets(&self) -> Result<Vec<BucketRecord>, ProviderError>;

    async fn list_security_groups(&self) -> Result<Vec<SecurityGroupRecord>, ProviderError>;

    async fn list_identities(&self) -> Result<Vec<IdentityRecord>, ProviderError>;

    async fn count_mfa_devices(&self, username: &str) -> Result<usize, ProviderError>;

    async fn list_database_instances(&self) -> Result<Vec<DatabaseRecord>, ProviderError>;

    async fn list_compute_functions(&self) -> Result<Vec<FunctionRecord>, ProviderError>;

    /// Provider name for logging and the report context
    fn provider_name(&self) -> &str;
}
