use serde::{Deserialize, Serialize};

/// Service category audited by one check. Declaration order is the standard run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Storage,
    Network,
    Identity,
    Database,
    Compute,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Storage,
        Category::Network,
        Category::Identity,
        Category::Database,
        Category::Compute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Network => "network",
            Self::Identity => "identity",
            Self::Database => "database",
            Self::Compute => "compute",
        }
    }

    /// Short name of the backing cloud service, used as dashboard card titles.
    pub fn service_label(&self) -> &'static str {
        match self {
            Self::Storage => "S3",
            Self::Network => "EC2",
            Self::Identity => "IAM",
            Self::Database => "RDS",
            Self::Compute => "Lambda",
        }
    }

    /// What a finding in this category means, e.g. "Public Buckets".
    pub fn finding_label(&self) -> &'static str {
        match self {
            Self::Storage => "Public Buckets",
            Self::Network => "Open Security Groups",
            Self::Identity => "Users without MFA",
            Self::Database => "Public RDS Instances",
            Self::Compute => "Risky Lambda Functions",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "storage" | "s3" => Some(Self::Storage),
            "network" | "ec2" => Some(Self::Network),
            "identity" | "iam" => Some(Self::Identity),
            "database" | "rds" => Some(Self::Database),
            "compute" | "lambda" => Some(Self::Compute),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a resource was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    PublicAccess,
    OpenIngress,
    NoMfa,
    PubliclyAccessible,
    PrivilegedRole,
}

impl Reason {
    /// Status text shown next to the resource in rendered reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PublicAccess => "Public",
            Self::OpenIngress => "Open to 0.0.0.0/0",
            Self::NoMfa => "No MFA",
            Self::PubliclyAccessible => "Public",
            Self::PrivilegedRole => "Risky Role",
        }
    }
}

/// A single flagged resource. Never mutated after a check produces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub resource: String,
    pub reason: Reason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Finding {
    pub fn new(category: Category, resource: impl Into<String>, reason: Reason) -> Self {
        Self {
            category,
            resource: resource.into(),
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
