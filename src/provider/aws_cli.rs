use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use super::client::*;
use super::timeout::call_with_timeout;
use tracing::debug;

/// Static credentials handed to the AWS CLI through the child environment only.
#[derive(Clone, Default)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AwsCliSettings {
    pub cli_path: String,
    pub region: String,
    pub profile: Option<String>,
    pub credentials: Option<AwsCredentials>,
    /// Deadline for each CLI invocation, not for a whole facade operation.
    pub call_timeout: Duration,
}

/// Facade backed by the `aws` command-line tool. Each invocation uses JSON
/// output and its own deadline; the CLI handles pagination and signing.
pub struct AwsCliProvider {
    settings: AwsCliSettings,
}

impl AwsCliProvider {
    pub fn new(settings: AwsCliSettings) -> Self {
        Self { settings }
    }

    async fn invoke(&self, operation: &str, args: &[&str], regional: bool) -> Result<String, ProviderError> {
        let mut cmd = Command::new(&self.settings.cli_path);
        cmd.args(args).args(["--output", "json"]);
        if regional {
            cmd.arg("--region").arg(&self.settings.region);
        }
        if let Some(profile) = &self.settings.profile {
            cmd.arg("--profile").arg(profile);
        }
        if let Some(creds) = &self.settings.credentials {
            cmd.env("AWS_ACCESS_KEY_ID", &creds.access_key_id)
                .env("AWS_SECRET_ACCESS_KEY", &creds.secret_access_key);
            if let Some(token) = &creds.session_token {
                cmd.env("AWS_SESSION_TOKEN", token);
            }
        }
        cmd.env("AWS_PAGER", "")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(operation, region = %self.settings.region, "Invoking aws cli");

        // kill_on_drop kills the child when the deadline drops this future
        let output = call_with_timeout(operation, self.settings.call_timeout, async {
            cmd.output().await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProviderError::Unavailable(format!("'{}' not found on PATH", self.settings.cli_path))
                } else {
                    ProviderError::call(operation, e.to_string())
                }
            })
        })
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            let message = if message.is_empty() {
                format!("exited with {}", output.status)
            } else {
                message.to_string()
            };
            return Err(ProviderError::call(operation, message));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| ProviderError::malformed(operation, e.to_string()))
    }

    async fn invoke_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        args: &[&str],
        regional: bool,
    ) -> Result<T, ProviderError> {
        let raw = self.invoke(operation, args, regional).await?;
        parse_json(operation, &raw)
    }
}

fn parse_json<T: DeserializeOwned>(operation: &str, raw: &str) -> Result<T, ProviderError> {
    serde_json::from_str(raw).map_err(|e| ProviderError::malformed(operation, e.to_string()))
}

// AWS CLI response shapes. Only the fields the checks read are modelled.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketsResponse {
    #[serde(default)]
    buckets: Vec<BucketEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BucketEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BucketAclResponse {
    #[serde(default)]
    grants: Vec<GrantEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GrantEntry {
    #[serde(default)]
    grantee: Option<GranteeEntry>,
    #[serde(default)]
    permission: String,
}

#[derive(Debug, Deserialize)]
struct GranteeEntry {
    #[serde(rename = "URI", default)]
    uri: Option<String>,
    #[serde(rename = "ID", default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SecurityGroupsResponse {
    #[serde(default)]
    security_groups: Vec<SecurityGroupEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SecurityGroupEntry {
    group_name: String,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    ip_permissions: Vec<IpPermissionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IpPermissionEntry {
    #[serde(default)]
    ip_protocol: Option<String>,
    #[serde(default)]
    from_port: Option<i32>,
    #[serde(default)]
    to_port: Option<i32>,
    #[serde(default)]
    ip_ranges: Vec<IpRangeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IpRangeEntry {
    #[serde(default)]
    cidr_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListUsersResponse {
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserEntry {
    user_name: String,
}

#[derive(Debug, Deserialize)]
struct MfaDevicesResponse {
    #[serde(rename = "MFADevices", default)]
    mfa_devices: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DbInstancesResponse {
    #[serde(rename = "DBInstances", default)]
    db_instances: Vec<DbInstanceEntry>,
}

#[derive(Debug, Deserialize)]
struct DbInstanceEntry {
    #[serde(rename = "DBInstanceIdentifier")]
    identifier: String,
    #[serde(rename = "Engine", default)]
    engine: Option<String>,
    #[serde(rename = "PubliclyAccessible", default)]
    publicly_accessible: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListFunctionsResponse {
    #[serde(default)]
    functions: Vec<FunctionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionEntry {
    function_name: String,
    #[serde(default)]
    role: String,
}

fn to_grants(acl: BucketAclResponse) -> Vec<AccessGrant> {
    acl.grants
        .into_iter()
        .map(|g| {
            let (uri, id) = match g.grantee {
                Some(grantee) => (grantee.uri, grantee.id),
                None => (None, None),
            };
            AccessGrant { grantee_uri: uri, grantee_id: id, permission: g.permission }
        })
        .collect()
}

fn to_security_groups(resp: SecurityGroupsResponse) -> Vec<SecurityGroupRecord> {
    resp.security_groups
        .into_iter()
        .map(|g| {
            let inbound_rules = g.ip_permissions
                .into_iter()
                .flat_map(|perm| {
                    let protocol = perm.ip_protocol.unwrap_or_else(|| "-1".to_string());
                    let (from_port, to_port) = (perm.from_port, perm.to_port);
                    perm.ip_ranges.into_iter().filter_map(move |range| {
                        range.cidr_ip.map(|cidr| InboundRule {
                            protocol: protocol.clone(),
                            from_port,
                            to_port,
                            source_cidr: cidr,
                        })
                    })
                })
                .collect();
            SecurityGroupRecord { group_id: g.group_id, name: g.group_name, inbound_rules }
        })
        .collect()
}

#[async_trait]
impl CloudProvider for AwsCliProvider {
    async fn list_storage_buckets(&self) -> Result<Vec<BucketRecord>, ProviderError> {
        let listing: ListBucketsResponse = self
            .invoke_json("s3api list-buckets", &["s3api", "list-buckets"], true)
            .await?;

        let mut buckets = Vec::with_capacity(listing.buckets.len());
        for bucket in listing.buckets {
            let acl: BucketAclResponse = self
                .invoke_json(
                    "s3api get-bucket-acl",
                    &["s3api", "get-bucket-acl", "--bucket", &bucket.name],
                    true,
                )
                .await?;
            buckets.push(BucketRecord { name: bucket.name, grants: to_grants(acl) });
        }
        Ok(buckets)
    }

    async fn list_security_groups(&self) -> Result<Vec<SecurityGroupRecord>, ProviderError> {
        let resp: SecurityGroupsResponse = self
            .invoke_json("ec2 describe-security-groups", &["ec2", "describe-security-groups"], true)
            .await?;
        Ok(to_security_groups(resp))
    }

    async fn list_identities(&self) -> Result<Vec<IdentityRecord>, ProviderError> {
        // IAM is a global service: no region flag
        let resp: ListUsersResponse = self
            .invoke_json("iam list-users", &["iam", "list-users"], false)
            .await?;
        Ok(resp.users.into_iter().map(|u| IdentityRecord { username: u.user_name }).collect())
    }

    async fn count_mfa_devices(&self, username: &str) -> Result<usize, ProviderError> {
        let resp: MfaDevicesResponse = self
            .invoke_json(
                "iam list-mfa-devices",
                &["iam", "list-mfa-devices", "--user-name", username],
                false,
            )
            .await?;
        Ok(resp.mfa_devices.len())
    }

    async fn list_database_instances(&self) -> Result<Vec<DatabaseRecord>, ProviderError> {
        let resp: DbInstancesResponse = self
            .invoke_json("rds describe-db-instances", &["rds", "describe-db-instances"], true)
            .await?;
        Ok(resp.db_instances
            .into_iter()
            .map(|db| DatabaseRecord {
                identifier: db.identifier,
                engine: db.engine,
                publicly_accessible: db.publicly_accessible,
            })
            .collect())
    }

    async fn list_compute_functions(&self) -> Result<Vec<FunctionRecord>, ProviderError> {
        let resp: ListFunctionsResponse = self
            .invoke_json("lambda list-functions", &["lambda", "list-functions"], true)
            .await?;
        Ok(resp.functions
            .into_iter()
            .map(|f| FunctionRecord { name: f.function_name, execution_role: f.role })
            .collect())
    }

    fn provider_name(&self) -> &str {
        "aws-cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_acl_grants() {
        let raw = r#"{
            "Owner": {"ID": "owner-id"},
            "Grants": [
                {"Grantee": {"ID": "owner-id", "Type": "CanonicalUser"}, "Permission": "FULL_CONTROL"},
                {"Grantee": {"Type": "Group", "URI": "http://acs.amazonaws.com/groups/global/AllUsers"}, "Permission": "READ"}
            ]
        }"#;
        let acl: BucketAclResponse = parse_json("s3api get-bucket-acl", raw).unwrap();
        let grants = to_grants(acl);
        assert_eq!(grants.len(), 2);
        assert!(!grants[0].is_all_users());
        assert_eq!(grants[0].grantee_id.as_deref(), Some("owner-id"));
        assert!(grants[1].is_all_users());
        assert_eq!(grants[1].permission, "READ");
    }

    #[test]
    fn test_parse_security_groups_flattens_ranges() {
        let raw = r#"{"SecurityGroups": [{
            "GroupName": "web",
            "GroupId": "sg-123",
            "IpPermissions": [
                {"IpProtocol": "tcp", "FromPort": 443, "ToPort": 443,
                 "IpRanges": [{"CidrIp": "0.0.0.0/0"}, {"CidrIp": "10.0.0.0/8"}]},
                {"IpProtocol": "-1", "IpRanges": [], "Ipv6Ranges": [{"CidrIpv6": "::/0"}]}
            ]
        }]}"#;
        let resp: SecurityGroupsResponse = parse_json("ec2 describe-security-groups", raw).unwrap();
        let groups = to_security_groups(resp);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "web");
        assert_eq!(groups[0].group_id.as_deref(), Some("sg-123"));
        assert_eq!(groups[0].inbound_rules.len(), 2);
        assert_eq!(groups[0].inbound_rules[0].source_cidr, "0.0.0.0/0");
        assert_eq!(groups[0].inbound_rules[0].port_range(), "tcp/443");
        assert_eq!(groups[0].inbound_rules[1].source_cidr, "10.0.0.0/8");
    }

    #[test]
    fn test_parse_db_instances() {
        let raw = r#"{"DBInstances": [
            {"DBInstanceIdentifier": "orders", "Engine": "postgres", "PubliclyAccessible": true},
            {"DBInstanceIdentifier": "internal"}
        ]}"#;
        let resp: DbInstancesResponse = parse_json("rds describe-db-instances", raw).unwrap();
        assert_eq!(resp.db_instances.len(), 2);
        assert!(resp.db_instances[0].publicly_accessible);
        assert!(!resp.db_instances[1].publicly_accessible);
    }

    #[test]
    fn test_parse_mfa_devices() {
        let raw = r#"{"MFADevices": [{"UserName": "alice", "SerialNumber": "arn:aws:iam::1:mfa/alice"}]}"#;
        let resp: MfaDevicesResponse = parse_json("iam list-mfa-devices", raw).unwrap();
        assert_eq!(resp.mfa_devices.len(), 1);
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_json::<ListUsersResponse>("iam list-users", "not json").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = AwsCredentials {
            access_key_id: "AKIAEXAMPLE".into(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG".into(),
            session_token: Some("token-value".into()),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("wJalrXUtnFEMI"));
        assert!(!debug.contains("token-value"));
    }

    #[tokio::test]
    async fn test_missing_cli_is_unavailable() {
        let provider = AwsCliProvider::new(AwsCliSettings {
            cli_path: "/nonexistent/aws-cli-binary".into(),
            region: "me-south-1".into(),
            profile: None,
            credentials: None,
            call_timeout: Duration::from_secs(5),
        });
        let err = provider.list_identities().await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    /// Writes an executable stand-in for the aws CLI that sleeps before every
    /// answer. It lists `bucket_count` buckets, each with an empty ACL.
    #[cfg(unix)]
    fn slow_fake_cli(dir: &std::path::Path, delay: &str, bucket_count: usize) -> String {
        use std::os::unix::fs::PermissionsExt;

        let buckets: Vec<String> = (0..bucket_count)
            .map(|i| format!("{{\"Name\":\"bucket-{}\"}}", i))
            .collect();
        let script = format!(
            "#!/bin/sh\nsleep {delay}\ncase \"$2\" in\n  list-buckets) echo '{{\"Buckets\":[{}]}}' ;;\n  get-bucket-acl) echo '{{\"Grants\":[]}}' ;;\n  *) echo 'unsupported' >&2; exit 1 ;;\nesac\n",
            buckets.join(",")
        );
        let path = dir.join("aws");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    fn fake_cli_provider(cli_path: String, call_timeout: Duration) -> AwsCliProvider {
        AwsCliProvider::new(AwsCliSettings {
            cli_path,
            region: "me-south-1".into(),
            profile: None,
            credentials: None,
            call_timeout,
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deadline_applies_per_invocation() {
        // 1 + 8 invocations at 0.2s each run well past the 1s deadline in total
        let dir = tempfile::TempDir::new().unwrap();
        let cli = slow_fake_cli(dir.path(), "0.2", 8);
        let provider = fake_cli_provider(cli, Duration::from_secs(1));

        let buckets = provider.list_storage_buckets().await.unwrap();
        assert_eq!(buckets.len(), 8);
        assert_eq!(buckets[0].name, "bucket-0");
        assert!(buckets.iter().all(|b| b.grants.is_empty()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_invocation_times_out() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = slow_fake_cli(dir.path(), "5", 1);
        let provider = fake_cli_provider(cli, Duration::from_millis(200));

        let err = provider.list_storage_buckets().await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Timeout { ref operation, .. } if operation == "s3api list-buckets"
        ));
    }
}
