use serde::{Deserialize, Serialize};
use crate::pipeline::ExecutionMode;
use crate::provider::ProviderKind;
use crate::reporting::OutputFormat;

pub const DEFAULT_REGION: &str = "me-south-1";
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "./results";
pub const DEFAULT_CLI_PATH: &str = "aws";

/// On-disk configuration. Every field is optional; defaults apply at resolve time.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AuditConfig {
    pub provider: Option<ProviderConfig>,
    pub audit: Option<AuditSection>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProviderConfig {
    pub kind: Option<ProviderKind>,
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Literal or `$ENV_VAR` reference.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub cli_path: Option<String>,
    pub snapshot_path: Option<String>,
    pub call_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AuditSection {
    /// Check names in run order. Service aliases (`s3`, `iam`, ...) are accepted.
    pub checks: Option<Vec<String>>,
    pub execution: Option<ExecutionMode>,
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub formats: Option<Vec<OutputFormat>>,
}
