//! Shared application state for the exporter.
//!
//! Holds only immutable config, the collector, and the self-metrics
//! registry; every scrape builds its exposition from scratch.

use std::sync::Arc;
use std::time::Instant;

use varnish_exporter_core::error::Result;
use varnish_exporter_core::stats::Exposition;

use crate::collect::Collector;
use crate::config::ExporterConfig;
use crate::obs::ExporterMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    collector: Collector,
    metrics: ExporterMetrics,
}

impl AppState {
    /// Build state with command-backed collaborators from `cfg`.
    pub fn new(cfg: ExporterConfig) -> Self {
        let collector = Collector::from_config(&cfg);
        Self::with_collector(cfg, collector)
    }

    pub fn with_collector(cfg: ExporterConfig, collector: Collector) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                collector,
                metrics: ExporterMetrics::default(),
            }),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.inner.metrics
    }

    /// Run one collection cycle, recording its outcome.
    pub async fn scrape(&self) -> Result<Exposition> {
        let started = Instant::now();
        let res = self.inner.collector.collect().await;
        let metrics = &self.inner.metrics;

        match &res {
            Ok(exp) => {
                for skipped in &exp.skipped {
                    tracing::debug!(key = %skipped.key, reason = ?skipped.reason, "unrecognized counter key");
                }
                if !exp.skipped.is_empty() {
                    tracing::info!(count = exp.skipped.len(), "skipped unrecognized counter keys");
                }
                metrics
                    .unrecognized_keys
                    .set(i64::try_from(exp.skipped.len()).unwrap_or(i64::MAX));
                metrics.scrapes.inc(&[("result", "ok")]);
                metrics
                    .scrape_duration
                    .observe(&[("result", "ok")], started.elapsed());
            }
            Err(e) => {
                let code = e.code().as_str();
                tracing::error!(code, error = %e, "collection failed");
                metrics.scrapes.inc(&[("result", "error")]);
                metrics.scrape_errors.inc(&[("code", code)]);
                metrics
                    .scrape_duration
                    .observe(&[("result", "error")], started.elapsed());
            }
        }
        res
    }
}
