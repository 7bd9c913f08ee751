//! One collection cycle: resolve the active VCL, read counters, render.

use std::sync::Arc;

use varnish_exporter_core::error::{ExporterError, Result};
use varnish_exporter_core::stats::{decode_counters, generate, Exposition};
use varnish_exporter_core::vcl::resolve_active_revision;

use crate::config::ExporterConfig;
use crate::source::{CommandSource, TextSource};

pub struct Collector {
    stats: Arc<dyn TextSource>,
    vcl: Option<Arc<dyn TextSource>>,
}

impl Collector {
    /// `vcl: None` disables VCL resolution; the active VCL is then empty.
    pub fn new(stats: Arc<dyn TextSource>, vcl: Option<Arc<dyn TextSource>>) -> Self {
        Self { stats, vcl }
    }

    pub fn from_config(cfg: &ExporterConfig) -> Self {
        let stats: Arc<dyn TextSource> = Arc::new(CommandSource::new(cfg.stats_command()));
        let vcl = if cfg.exporter.no_admin {
            None
        } else {
            Some(Arc::new(CommandSource::new(cfg.vcl_command())) as Arc<dyn TextSource>)
        };
        Self::new(stats, vcl)
    }

    pub fn resolves_vcl(&self) -> bool {
        self.vcl.is_some()
    }

    /// Active VCL name, or `""` when resolution is disabled.
    pub async fn active_revision(&self) -> Result<String> {
        let Some(vcl) = &self.vcl else {
            return Ok(String::new());
        };
        let raw = vcl
            .read()
            .await
            .map_err(|e| ExporterError::RevisionResolutionFailed(e.to_string()))?;
        resolve_active_revision(&raw)
            .map_err(|e| ExporterError::RevisionResolutionFailed(e.to_string()))
    }

    /// Run a full cycle. Any collaborator failure aborts the whole cycle.
    pub async fn collect(&self) -> Result<Exposition> {
        let active = self.active_revision().await?;

        let raw = self
            .stats
            .read()
            .await
            .map_err(|e| ExporterError::StatsUnavailable(e.to_string()))?;
        let counters =
            decode_counters(&raw).map_err(|e| ExporterError::StatsUnavailable(e.to_string()))?;

        Ok(generate(&counters, &active))
    }
}
