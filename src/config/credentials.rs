use crate::errors::AuditError;
use crate::provider::AwsCredentials;
use tracing::debug;

/// Variables consulted when the config file names no keys.
pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_KEY";

/// Resolve a credential value. A value starting with '$' names an environment
/// variable; an unset variable is a configuration error rather than a literal.
pub fn resolve_credential(value: &str) -> Result<String, AuditError> {
    match value.strip_prefix('$') {
        Some(var_name) => match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                Ok(resolved)
            }
            Err(_) => Err(AuditError::Config(format!(
                "Credential references environment variable {} which is not set",
                var_name
            ))),
        },
        None => Ok(value.to_string()),
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Build static credentials from configured values, falling back to
/// `AWS_ACCESS_KEY` / `AWS_SECRET_KEY`. `None` leaves the CLI's own chain in charge.
pub fn resolve_aws_credentials(
    access_key_id: Option<&str>,
    secret_access_key: Option<&str>,
    session_token: Option<&str>,
) -> Result<Option<AwsCredentials>, AuditError> {
    let access = match access_key_id {
        Some(v) => Some(resolve_credential(v)?),
        None => env_nonempty(ACCESS_KEY_ENV),
    };
    let secret = match secret_access_key {
        Some(v) => Some(resolve_credential(v)?),
        None => env_nonempty(SECRET_KEY_ENV),
    };
    let token = session_token.map(resolve_credential).transpose()?;

    match (access, secret) {
        (Some(access_key_id), Some(secret_access_key)) => {
            debug!(access_key_id = %access_key_id, "Using static AWS credentials");
            Ok(Some(AwsCredentials { access_key_id, secret_access_key, session_token: token }))
        }
        (None, None) => {
            if token.is_some() {
                return Err(AuditError::Config(
                    "session_token given without access_key_id and secret_access_key".into(),
                ));
            }
            Ok(None)
        }
        (Some(_), None) => Err(AuditError::Config(
            "access key id configured without a secret access key".into(),
        )),
        (None, Some(_)) => Err(AuditError::Config(
            "secret access key configured without an access key id".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credential_literal() {
        assert_eq!(resolve_credential("AKIAEXAMPLE").unwrap(), "AKIAEXAMPLE");
    }

    #[test]
    fn test_resolve_credential_env_var() {
        std::env::set_var("TEST_CLOUD_AUDIT_CRED", "secret123");
        assert_eq!(resolve_credential("$TEST_CLOUD_AUDIT_CRED").unwrap(), "secret123");
        std::env::remove_var("TEST_CLOUD_AUDIT_CRED");
    }

    #[test]
    fn test_resolve_credential_missing_env_var() {
        let err = resolve_credential("$NONEXISTENT_CLOUD_AUDIT_VAR").unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
        assert!(err.to_string().contains("NONEXISTENT_CLOUD_AUDIT_VAR"));
    }

    #[test]
    fn test_explicit_pair_is_used() {
        let creds = resolve_aws_credentials(Some("AKIA1"), Some("secret"), Some("token"))
            .unwrap()
            .unwrap();
        assert_eq!(creds.access_key_id, "AKIA1");
        assert_eq!(creds.secret_access_key, "secret");
        assert_eq!(creds.session_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_half_configured_pair_is_rejected() {
        let err = resolve_aws_credentials(Some("AKIA1"), Some("$UNSET_CLOUD_AUDIT_SECRET"), None);
        assert!(err.is_err());
    }
}
