//! Local host inventory: firewall state, listening sockets and user accounts.
//!
//! Independent of the cloud audit. Each probe shells out to a platform tool;
//! a probe that fails degrades to `Unknown` or an empty list and is logged.

use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use crate::errors::AuditError;
use tracing::{debug, info, warn};

pub const SYSTEM_REPORT_FILE_NAME: &str = "system_report.json";
pub const MAX_LISTENING_LINES: usize = 10;

const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

static LISTEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bLISTEN(ING)?\b").expect("hard-coded listen regex must compile"));
static COLUMN_GAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("hard-coded column regex must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirewallStatus {
    Enabled,
    Disabled,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemReport {
    pub generated_at: DateTime<Utc>,
    pub os: String,
    pub firewall: FirewallStatus,
    /// At most [`MAX_LISTENING_LINES`] raw socket lines.
    pub listening: Vec<String>,
    pub users: Vec<String>,
}

/// `netsh advfirewall show allprofiles`: any profile reporting OFF means disabled.
pub fn parse_netsh_firewall(output: &str) -> FirewallStatus {
    if output.trim().is_empty() {
        FirewallStatus::Unknown
    } else if output.contains("OFF") {
        FirewallStatus::Disabled
    } else {
        FirewallStatus::Enabled
    }
}

/// `ufw status` prints `Status: active` or `Status: inactive`.
pub fn parse_ufw_status(output: &str) -> FirewallStatus {
    for line in output.lines() {
        if let Some(state) = line.trim().strip_prefix("Status:") {
            return match state.trim() {
                "active" => FirewallStatus::Enabled,
                "inactive" => FirewallStatus::Disabled,
                _ => FirewallStatus::Unknown,
            };
        }
    }
    FirewallStatus::Unknown
}

/// Keep lines describing listening sockets, up to the cap.
pub fn parse_listening(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| LISTEN_RE.is_match(line))
        .take(MAX_LISTENING_LINES)
        .map(str::to_string)
        .collect()
}

/// `net user` prints a header, a rule of dashes, names in columns, then a
/// trailing status line.
pub fn parse_net_user(output: &str) -> Vec<String> {
    let lines: Vec<&str> = output.lines().collect();
    let Some(rule) = lines.iter().position(|l| l.trim_start().starts_with("---")) else {
        return Vec::new();
    };

    lines[rule + 1..]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .take_while(|l| !l.starts_with("The command"))
        .flat_map(|l| COLUMN_GAP_RE.split(l).map(str::to_string).collect::<Vec<_>>())
        .filter(|name| !name.is_empty())
        .collect()
}

/// First field of each `/etc/passwd` entry.
pub fn parse_passwd(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split(':').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

async fn run_probe(program: &str, args: &[&str]) -> Result<String, String> {
    debug!(program, ?args, "Running system probe");
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(PROBE_TIMEOUT, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(format!("failed to start {}: {}", program, e)),
        Err(_) => return Err(format!("{} timed out after {}s", program, PROBE_TIMEOUT.as_secs())),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} exited with {}: {}", program, output.status, stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

async fn probe_firewall() -> FirewallStatus {
    let result = if cfg!(windows) {
        run_probe("netsh", &["advfirewall", "show", "allprofiles"]).await.map(|o| parse_netsh_firewall(&o))
    } else {
        run_probe("ufw", &["status"]).await.map(|o| parse_ufw_status(&o))
    };
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Firewall probe failed");
        FirewallStatus::Unknown
    })
}

async fn probe_listening() -> Vec<String> {
    let primary = if cfg!(windows) {
        run_probe("netstat", &["-an"]).await
    } else {
        match run_probe("ss", &["-ltn"]).await {
            Ok(out) => Ok(out),
            Err(e) => {
                debug!(error = %e, "ss unavailable, falling back to netstat");
                run_probe("netstat", &["-an"]).await
            }
        }
    };
    match primary {
        Ok(out) => parse_listening(&out),
        Err(e) => {
            warn!(error = %e, "Listening socket probe failed");
            Vec::new()
        }
    }
}

async fn probe_users() -> Vec<String> {
    if cfg!(windows) {
        match run_probe("net", &["user"]).await {
            Ok(out) => parse_net_user(&out),
            Err(e) => {
                warn!(error = %e, "User probe failed");
                Vec::new()
            }
        }
    } else {
        match tokio::fs::read_to_string("/etc/passwd").await {
            Ok(content) => parse_passwd(&content),
            Err(e) => {
                warn!(error = %e, "Could not read /etc/passwd");
                Vec::new()
            }
        }
    }
}

/// Run all probes concurrently. Never fails; unavailable data is left empty.
pub async fn collect_system_report() -> SystemReport {
    let (firewall, listening, users) = tokio::join!(probe_firewall(), probe_listening(), probe_users());
    let report = SystemReport {
        generated_at: Utc::now(),
        os: std::env::consts::OS.to_string(),
        firewall,
        listening,
        users,
    };
    info!(
        os = %report.os,
        firewall = ?report.firewall,
        listening = report.listening.len(),
        users = report.users.len(),
        "System inventory collected"
    );
    report
}

pub async fn write_system_report(report: &SystemReport, path: &Path) -> Result<(), AuditError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(report)?).await?;
    info!(path = %path.display(), "System report written");
    Ok(())
}
