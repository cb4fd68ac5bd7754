use std::path::PathBuf;

use crate::checks::CheckRegistry;
use crate::cli::commands::RunArgs;
use crate::cli::progress::AuditProgress;
use crate::config::{self, AuditConfig, ConfigOverrides};
use crate::errors::AuditError;
use crate::models::{Report, ReportContext};
use crate::pipeline::AuditRunner;
use crate::provider::create_provider;
use crate::reporting::{write_reports, OutputFormat, ReportAggregator};
use tokio::sync::mpsc;
use tracing::info;

pub async fn handle_run(args: RunArgs, quiet: bool) -> Result<(), AuditError> {
    let file_config = match &args.config {
        Some(path) => config::parse_config(&PathBuf::from(path)).await?,
        None => AuditConfig::default(),
    };
    let resolved = config::resolve(&file_config, &build_overrides(&args)?)?;

    info!(
        provider = %resolved.provider.kind,
        region = %resolved.provider.region,
        checks = resolved.checks.len(),
        mode = %resolved.run.mode,
        "Starting cloud audit"
    );

    let provider = create_provider(&resolved.provider).await?;
    let registry = CheckRegistry::select(&resolved.checks)?;
    let context = ReportContext {
        region: resolved.provider.region.clone(),
        provider: provider.provider_name().to_string(),
        ..Default::default()
    };

    let mut runner = AuditRunner::new(registry, provider, resolved.run);
    let progress_task = if quiet {
        None
    } else {
        let (tx, mut rx) = mpsc::unbounded_channel();
        runner = runner.with_event_channel(tx);
        Some(tokio::spawn(async move {
            let mut progress = AuditProgress::new();
            while let Some(event) = rx.recv().await {
                progress.handle_event(&event);
            }
        }))
    };

    let outcomes = runner.run().await;
    // Closes the event channel so the progress task drains and exits
    drop(runner);
    if let Some(task) = progress_task {
        let _ = task.await;
    }

    let report = ReportAggregator::new(context).aggregate(outcomes);
    let written = write_reports(&report, &resolved.output_dir, &resolved.formats).await?;

    if let Some(summary) = &written.terminal {
        print!("{}", summary);
    }
    if !quiet {
        for path in &written.files {
            println!("Report written: {}", path.display());
        }
    }

    finish(&report, args.fail_on_findings)
}

fn finish(report: &Report, fail_on_findings: bool) -> Result<(), AuditError> {
    info!(
        run_id = %report.run_id,
        total_findings = report.summary.total_findings,
        failed_checks = report.summary.failed_checks,
        "Audit finished"
    );
    if fail_on_findings && report.summary.total_findings > 0 {
        return Err(AuditError::FindingsReported(report.summary.total_findings));
    }
    Ok(())
}

pub(crate) fn parse_formats(raw: &str) -> Result<Vec<OutputFormat>, AuditError> {
    let formats = split_list(raw)
        .into_iter()
        .map(|name| {
            OutputFormat::parse(&name)
                .ok_or_else(|| AuditError::InvalidArgument(format!("Unknown output format '{}'", name)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if formats.is_empty() {
        return Err(AuditError::InvalidArgument("--format needs at least one format".into()));
    }
    Ok(formats)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn build_overrides(args: &RunArgs) -> Result<ConfigOverrides, AuditError> {
    let formats = args.format.as_deref().map(parse_formats).transpose()?;
    Ok(ConfigOverrides {
        region: args.region.clone(),
        profile: args.profile.clone(),
        snapshot: args.snapshot.as_ref().map(PathBuf::from),
        timeout_secs: args.timeout,
        sequential: args.sequential,
        max_concurrency: args.max_concurrency,
        checks: args.checks.as_deref().map(split_list),
        output: args.output.as_ref().map(PathBuf::from),
        formats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CheckOutcome, Finding, Reason};

    #[test]
    fn test_parse_formats() {
        assert_eq!(
            parse_formats("json, terminal").unwrap(),
            vec![OutputFormat::Json, OutputFormat::Terminal]
        );
        assert!(matches!(parse_formats("pdf"), Err(AuditError::InvalidArgument(_))));
        assert!(parse_formats(" , ").is_err());
    }

    #[test]
    fn test_build_overrides_splits_checks() {
        let args = RunArgs {
            checks: Some("s3, iam".into()),
            snapshot: Some("inv.yaml".into()),
            ..Default::default()
        };
        let overrides = build_overrides(&args).unwrap();
        assert_eq!(overrides.checks.unwrap(), vec!["s3", "iam"]);
        assert_eq!(overrides.snapshot, Some(PathBuf::from("inv.yaml")));
    }

    #[test]
    fn test_fail_on_findings() {
        let report = ReportAggregator::new(ReportContext::default()).aggregate(vec![(
            Category::Storage,
            CheckOutcome::success(vec![Finding::new(Category::Storage, "b", Reason::PublicAccess)]),
        )]);
        assert!(finish(&report, false).is_ok());
        assert!(matches!(finish(&report, true), Err(AuditError::FindingsReported(1))));
    }
}
