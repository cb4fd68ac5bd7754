use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use crate::checks::{Check, CheckRegistry};
use crate::models::{Category, CheckOutcome};
use crate::provider::CloudProvider;
use super::events::AuditEvent;
use super::state::RunConfig;
use tracing::{info, warn, error};

/// Runs every registered check exactly once against one provider and returns
/// one outcome per check, in registry order.
///
/// The runner itself cannot fail: provider errors and panics inside a check
/// become a `Failed` outcome for that check's category and never affect the
/// other checks. There are no retries.
pub struct AuditRunner {
    registry: CheckRegistry,
    provider: Arc<dyn CloudProvider>,
    config: RunConfig,
    event_tx: Option<mpsc::UnboundedSender<AuditEvent>>,
}

impl AuditRunner {
    pub fn new(registry: CheckRegistry, provider: Arc<dyn CloudProvider>, config: RunConfig) -> Self {
        Self { registry, provider, config, event_tx: None }
    }

    /// Attach an event channel for streaming progress to a display.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<AuditEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn emit(&self, event: AuditEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Run all checks. Returns only after every check has produced its outcome.
    pub async fn run(&self) -> Vec<(Category, CheckOutcome)> {
        let started = Instant::now();
        let width = self.config.width();
        info!(
            checks = self.registry.len(),
            mode = %self.config.mode,
            width,
            provider = %self.provider.provider_name(),
            "Audit started"
        );
        self.emit(AuditEvent::AuditStarted { check_count: self.registry.len() });

        let provider = self.provider.as_ref();

        // `buffered` keeps at most `width` checks in flight and yields in input order
        let outcomes: Vec<(Category, CheckOutcome)> = futures::stream::iter(self.registry.iter())
            .map(|check| self.run_check(check, provider))
            .buffered(width)
            .collect()
            .await;

        let total_findings: usize = outcomes.iter().map(|(_, o)| o.finding_count()).sum();
        let failed_checks = outcomes.iter().filter(|(_, o)| o.is_failed()).count();
        let duration_ms = started.elapsed().as_millis() as u64;

        info!(total_findings, failed_checks, duration_ms, "Audit completed");
        self.emit(AuditEvent::AuditCompleted { total_findings, failed_checks, duration_ms });

        outcomes
    }

    async fn run_check(&self, check: &dyn Check, provider: &dyn CloudProvider) -> (Category, CheckOutcome) {
        let category = check.category();
        info!(category = %category, check = check.display_name(), "Running check");
        self.emit(AuditEvent::CheckStarted {
            category,
            display_name: check.display_name().to_string(),
        });

        let start = Instant::now();
        let outcome = match AssertUnwindSafe(check.run(provider)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(category = %category, panic = %message, "Check panicked");
                CheckOutcome::failed(category, format!("check panicked: {}", message))
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            CheckOutcome::Success { findings } => {
                info!(category = %category, findings = findings.len(), duration_ms, "Check completed");
                self.emit(AuditEvent::CheckCompleted { category, findings: findings.len(), duration_ms });
            }
            CheckOutcome::Failed { error } => {
                warn!(category = %category, error = %error.cause, duration_ms, "Check failed");
                self.emit(AuditEvent::CheckFailed {
                    category,
                    error: error.cause.clone(),
                    duration_ms,
                });
            }
        }

        (category, outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::models::{Finding, Reason};
    use crate::provider::*;

    struct EmptyProvider;

    #[async_trait]
    impl CloudProvider for EmptyProvider {
        async fn list_storage_buckets(&self) -> Result<Vec<BucketRecord>, ProviderError> { Ok(vec![]) }
        async fn list_security_groups(&self) -> Result<Vec<SecurityGroupRecord>, ProviderError> { Ok(vec![]) }
        async fn list_identities(&self) -> Result<Vec<IdentityRecord>, ProviderError> { Ok(vec![]) }
        async fn count_mfa_devices(&self, _username: &str) -> Result<usize, ProviderError> { Ok(0) }
        async fn list_database_instances(&self) -> Result<Vec<DatabaseRecord>, ProviderError> { Ok(vec![]) }
        async fn list_compute_functions(&self) -> Result<Vec<FunctionRecord>, ProviderError> { Ok(vec![]) }
        fn provider_name(&self) -> &str { "empty" }
    }

    struct PanickingCheck;

    #[async_trait]
    impl Check for PanickingCheck {
        fn category(&self) -> Category { Category::Database }
        fn display_name(&self) -> &'static str { "Panicking" }
        async fn collect(&self, _provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError> {
            panic!("unexpected record shape")
        }
    }

    struct FixedCheck(Category);

    #[async_trait]
    impl Check for FixedCheck {
        fn category(&self) -> Category { self.0 }
        fn display_name(&self) -> &'static str { "Fixed" }
        async fn collect(&self, _provider: &dyn CloudProvider) -> Result<Vec<Finding>, ProviderError> {
            Ok(vec![Finding::new(self.0, "resource-1", Reason::PublicAccess)])
        }
    }

    #[tokio::test]
    async fn test_panicking_check_is_isolated() {
        let registry = CheckRegistry::from_checks(vec![
            Box::new(FixedCheck(Category::Storage)),
            Box::new(PanickingCheck),
            Box::new(FixedCheck(Category::Compute)),
        ]).unwrap();
        let runner = AuditRunner::new(registry, Arc::new(EmptyProvider), RunConfig::default());
        let outcomes = runner.run().await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].0, Category::Storage);
        assert_eq!(outcomes[0].1.finding_count(), 1);
        assert_eq!(outcomes[1].0, Category::Database);
        let err = outcomes[1].1.error().unwrap();
        assert!(err.cause.contains("unexpected record shape"));
        assert_eq!(outcomes[2].1.finding_count(), 1);
    }

    #[tokio::test]
    async fn test_events_stream_per_check() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = AuditRunner::new(CheckRegistry::standard(), Arc::new(EmptyProvider), RunConfig::sequential())
            .with_event_channel(tx);
        let outcomes = runner.run().await;
        assert_eq!(outcomes.len(), 5);
        drop(runner);

        let mut started = 0;
        let mut completed = 0;
        let mut finished = false;
        while let Some(event) = rx.recv().await {
            match event {
                AuditEvent::CheckStarted { .. } => started += 1,
                AuditEvent::CheckCompleted { findings, .. } => {
                    assert_eq!(findings, 0);
                    completed += 1;
                }
                AuditEvent::AuditCompleted { total_findings, failed_checks, .. } => {
                    assert_eq!(total_findings, 0);
                    assert_eq!(failed_checks, 0);
                    finished = true;
                }
                _ => {}
            }
        }
        assert_eq!(started, 5);
        assert_eq!(completed, 5);
        assert!(finished);
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
