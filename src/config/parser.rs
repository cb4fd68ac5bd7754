use std::collections::HashSet;
use std::path::Path;

use crate::errors::AuditError;
use crate::models::Category;
use crate::provider::ProviderKind;
use super::types::AuditConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<AuditConfig, AuditError> {
    if !path.exists() {
        return Err(AuditError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(AuditError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parse config text. Empty documents yield the default config.
pub fn parse_config_str(content: &str) -> Result<AuditConfig, AuditError> {
    if content.trim().is_empty() {
        return Ok(AuditConfig::default());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    for warning in schema_warnings(&yaml)? {
        warn!(validation_error = %warning, "Config schema warning");
    }

    let config: AuditConfig = serde_yaml::from_value(yaml)?;
    validate_conflicts(&config)?;
    Ok(config)
}

/// Validate config against the JSON schema. Advisory: findings are returned, not raised.
pub fn schema_warnings(yaml: &serde_yaml::Value) -> Result<Vec<String>, AuditError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| AuditError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| AuditError::Config(format!("Schema compilation error: {}", e)))?;

    let messages = match compiled.validate(&json_value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect(),
    };
    Ok(messages)
}

/// Detect semantic conflicts the schema cannot express.
fn validate_conflicts(config: &AuditConfig) -> Result<(), AuditError> {
    if let Some(provider) = &config.provider {
        if provider.kind == Some(ProviderKind::Snapshot) && provider.snapshot_path.is_none() {
            return Err(AuditError::Config(
                "provider.kind is 'snapshot' but provider.snapshot_path is missing".into(),
            ));
        }
        if provider.call_timeout_secs == Some(0) {
            return Err(AuditError::Config("provider.call_timeout_secs must be at least 1".into()));
        }
        if provider.region.as_deref().map_or(false, |r| r.trim().is_empty()) {
            return Err(AuditError::Config("provider.region must not be empty".into()));
        }
    }

    if let Some(audit) = &config.audit {
        if audit.max_concurrency == Some(0) {
            return Err(AuditError::Config("audit.max_concurrency must be at least 1".into()));
        }
        if let Some(names) = &audit.checks {
            parse_check_names(names)?;
        }
    }

    if let Some(formats) = config.output.as_ref().and_then(|o| o.formats.as_ref()) {
        if formats.is_empty() {
            return Err(AuditError::Config("output.formats must name at least one format".into()));
        }
    }

    Ok(())
}

/// Turn check names into categories, keeping order. Unknown or repeated names fail.
pub fn parse_check_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<Category>, AuditError> {
    if names.is_empty() {
        return Err(AuditError::Config("at least one check must be selected".into()));
    }

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let category = Category::parse(name)
            .ok_or_else(|| AuditError::Config(format!("Unknown check '{}'", name)))?;
        if !seen.insert(category) {
            return Err(AuditError::Config(format!(
                "Check '{}' selected more than once",
                category
            )));
        }
        categories.push(category);
    }
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_is_default() {
        let config = parse_config_str("  \n").unwrap();
        assert!(config.provider.is_none());
    }

    #[test]
    fn test_snapshot_without_path_conflicts() {
        let err = parse_config_str("provider:\n  kind: snapshot\n").unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn test_zero_concurrency_conflicts() {
        assert!(parse_config_str("audit:\n  max_concurrency: 0\n").is_err());
    }

    #[test]
    fn test_unknown_check_name_conflicts() {
        let err = parse_config_str("audit:\n  checks: [s3, dns]\n").unwrap_err();
        assert!(err.to_string().contains("dns"));
    }

    #[test]
    fn test_parse_check_names_keeps_order_and_rejects_duplicates() {
        let order = parse_check_names(&["lambda", "s3"]).unwrap();
        assert_eq!(order, vec![Category::Compute, Category::Storage]);
        assert!(parse_check_names(&["s3", "storage"]).is_err());
        assert!(parse_check_names::<&str>(&[]).is_err());
    }

    #[test]
    fn test_schema_warnings_are_advisory() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("unexpected_section: 1\n").unwrap();
        let warnings = schema_warnings(&yaml).unwrap();
        assert!(!warnings.is_empty());
        assert!(parse_config_str("unexpected_section: 1\n").is_ok());
    }

    #[test]
    fn test_malformed_yaml_is_yaml_error() {
        let err = parse_config_str("provider: [unterminated").unwrap_err();
        assert!(matches!(err, AuditError::Yaml(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_parse_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.yaml");
        tokio::fs::write(&path, "provider:\n  region: us-east-1\n").await.unwrap();
        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.provider.unwrap().region.as_deref(), Some("us-east-1"));

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(parse_config(&missing).await, Err(AuditError::Config(_))));
    }

    #[tokio::test]
    async fn test_oversized_config_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.yaml");
        let padding = "#".repeat(MAX_CONFIG_BYTES as usize + 1);
        tokio::fs::write(&path, padding).await.unwrap();
        assert!(parse_config(&path).await.is_err());
    }
}
