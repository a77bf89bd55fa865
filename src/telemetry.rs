use anyhow::Result;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::workflow::TransactionId;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let json_layer = config.json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
    });
    let plain_layer = (!config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .try_init()?;

    tracing::debug!(json = config.json_logs, "Draftline telemetry initialized");
    Ok(())
}

/// Span wrapping one workflow operation against the backend.
pub fn create_workflow_span(
    operation: &str,
    collection: Option<&str>,
    slug: Option<&str>,
    transaction_id: Option<TransactionId>,
) -> tracing::Span {
    let span = tracing::info_span!(
        "workflow_operation",
        operation = operation,
        collection = collection,
        slug = slug,
        transaction.id = tracing::field::Empty,
    );
    if let Some(id) = transaction_id {
        span.record("transaction.id", tracing::field::display(id));
    }
    span
}

/// Time a backend call and log its duration when finished.
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn finish(self, success: bool) {
        let duration = self.start.elapsed();
        info!(
            operation = self.operation,
            duration_ms = duration.as_millis() as u64,
            success,
            "Backend call finished"
        );
    }
}
