use std::collections::HashMap;
use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use crate::models::Category;
use crate::pipeline::AuditEvent;
use crate::reporting::format_duration;

/// Progress bars driven by runner events.
pub struct AuditProgress {
    multi: MultiProgress,
    overall: Option<ProgressBar>,
    check_bars: HashMap<Category, ProgressBar>,
    findings: usize,
}

impl AuditProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            overall: None,
            check_bars: HashMap::new(),
            findings: 0,
        }
    }

    pub fn handle_event(&mut self, event: &AuditEvent) {
        match event {
            AuditEvent::AuditStarted { check_count } => {
                let bar = self.multi.add(ProgressBar::new(*check_count as u64));
                if let Ok(bar_style) = ProgressStyle::default_bar()
                    .template("  {bar:30.cyan/dark_gray} {pos}/{len} checks | {msg}")
                {
                    bar.set_style(bar_style.progress_chars("█▓░"));
                }
                bar.set_message("starting");
                self.overall = Some(bar);
            }
            AuditEvent::CheckStarted { category, display_name } => {
                let bar = match &self.overall {
                    Some(overall) => self.multi.insert_before(overall, ProgressBar::new_spinner()),
                    None => self.multi.add(ProgressBar::new_spinner()),
                };
                if let Ok(spinner) = ProgressStyle::default_spinner().template("    {spinner:.yellow} {msg}") {
                    bar.set_style(spinner);
                }
                bar.set_message(display_name.clone());
                bar.enable_steady_tick(Duration::from_millis(100));
                self.check_bars.insert(*category, bar);
            }
            AuditEvent::CheckCompleted { category, findings, duration_ms } => {
                self.findings += findings;
                let marker = if *findings == 0 { style("\u{2714}").green() } else { style("\u{2716}").red() };
                self.finish_check(
                    *category,
                    format!("  {} {} {} finding(s) in {}", marker, category.service_label(), findings, format_duration(*duration_ms)),
                );
            }
            AuditEvent::CheckFailed { category, error, duration_ms } => {
                self.finish_check(
                    *category,
                    format!(
                        "  {} {} failed after {}: {}",
                        style("!").yellow().bold(),
                        category.service_label(),
                        format_duration(*duration_ms),
                        style(error).dim()
                    ),
                );
            }
            AuditEvent::AuditCompleted { total_findings, failed_checks, duration_ms } => {
                for (_, bar) in self.check_bars.drain() {
                    bar.finish_and_clear();
                }
                if let Some(bar) = self.overall.take() {
                    bar.finish_with_message(format!(
                        "{} findings, {} failed, {}",
                        total_findings,
                        failed_checks,
                        format_duration(*duration_ms)
                    ));
                }
            }
        }
    }

    fn finish_check(&mut self, category: Category, line: String) {
        if let Some(bar) = self.check_bars.remove(&category) {
            bar.finish_and_clear();
        }
        if let Some(bar) = &self.overall {
            bar.inc(1);
            bar.set_message(format!("{} findings so far", self.findings));
        }
        let _ = self.multi.println(line);
    }
}

impl Default for AuditProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_consumes_full_event_sequence() {
        let mut progress = AuditProgress::new();
        progress.multi.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        progress.handle_event(&AuditEvent::AuditStarted { check_count: 2 });
        progress.handle_event(&AuditEvent::CheckStarted { category: Category::Storage, display_name: "S3".into() });
        progress.handle_event(&AuditEvent::CheckStarted { category: Category::Identity, display_name: "IAM".into() });
        progress.handle_event(&AuditEvent::CheckCompleted { category: Category::Storage, findings: 2, duration_ms: 10 });
        progress.handle_event(&AuditEvent::CheckFailed { category: Category::Identity, error: "denied".into(), duration_ms: 5 });
        assert_eq!(progress.findings, 2);
        assert!(progress.check_bars.is_empty());
        progress.handle_event(&AuditEvent::AuditCompleted { total_findings: 2, failed_checks: 1, duration_ms: 15 });
        assert!(progress.overall.is_none());
    }
}
