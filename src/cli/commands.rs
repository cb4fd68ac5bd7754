use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "cloud-audit", version, about = "Point-in-time security posture audit for a cloud account")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit a cloud account and write the report
    Run(RunArgs),
    /// Re-render the dashboard from a saved JSON report
    Render(RenderArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// Inventory the local host (firewall, listening sockets, users)
    System(SystemArgs),
}

#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Cloud region to audit
    #[arg(long)]
    pub region: Option<String>,

    /// Named AWS CLI profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Audit a recorded inventory snapshot instead of the live account
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Per-call provider timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Run checks one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Maximum checks in flight when running in parallel
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Comma-separated checks to run, in order (e.g. s3,iam)
    #[arg(long)]
    pub checks: Option<String>,

    /// Output directory for reports
    #[arg(short, long)]
    pub output: Option<String>,

    /// Comma-separated output formats: json, html, terminal
    #[arg(long)]
    pub format: Option<String>,

    /// Exit with status 4 when any finding is reported
    #[arg(long)]
    pub fail_on_findings: bool,
}

#[derive(Args, Clone)]
pub struct RenderArgs {
    /// Saved JSON report
    pub report: String,

    /// Output directory for the dashboard (defaults to the report's directory)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Comma-separated output formats: json, html, terminal
    #[arg(long, default_value = "html")]
    pub format: String,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Configuration file to validate
    pub config: String,
}

#[derive(Args, Clone)]
pub struct SystemArgs {
    /// Destination file
    #[arg(short, long, default_value = "system_report.json")]
    pub output: String,
}
