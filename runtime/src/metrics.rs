//! Prometheus metrics for store observability.
//!
//! Stores record metrics through the `metrics` facade unconditionally.
//! Nothing is exported until a recorder is installed with
//! [`MetricsExporter::install`]; binaries do this once at startup.
//!
//! # Example
//!
//! ```rust,no_run
//! use reactive_stores_runtime::metrics::MetricsExporter;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut exporter = MetricsExporter::new();
//! exporter.install()?;
//!
//! // ... run stores ...
//!
//! if let Some(text) = exporter.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder with text rendering.
#[derive(Default)]
pub struct MetricsExporter {
    handle: Option<PrometheusHandle>,
}

impl MetricsExporter {
    /// Create an exporter that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Describe the store metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., by another test) this logs a
    /// warning and succeeds without a handle; [`render`](Self::render) then
    /// returns `None`.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus metrics recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if this exporter did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!("store.actions.total", "Actions reduced by stores");
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time spent inside reducers"
    );
    describe_counter!(
        "store.effects.executed",
        "Effects started by stores, labelled by effect type"
    );
    describe_counter!(
        "store.effects.cancelled",
        "Scoped effects aborted by replacement, cancellation or disposal"
    );
    describe_counter!(
        "store.effects.dropped",
        "Scoped effects dropped because their scope was busy"
    );
    describe_counter!(
        "store.effects.stale",
        "Effect results discarded because their scope was superseded"
    );
    describe_counter!("store.retry.attempts", "Retries performed by fetch effects");
    describe_counter!("store.retry.successes", "Operations that succeeded after a retry");
    describe_counter!("store.retry.exhausted", "Operations that failed every attempt");
}

/// Retry metrics recorder.
pub struct RetryMetrics;

impl RetryMetrics {
    /// Record a retry attempt.
    pub fn record_attempt() {
        counter!("store.retry.attempts").increment(1);
    }

    /// Record a successful retry.
    pub fn record_success() {
        counter!("store.retry.successes").increment(1);
    }

    /// Record exhausted retries.
    pub fn record_exhausted() {
        counter!("store.retry.exhausted").increment(1);
    }
}
