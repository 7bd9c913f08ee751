//! Command-line flags. Flags override the config file.

use std::path::PathBuf;

use clap::Parser;

use varnish_exporter_core::error::Result;

use crate::config::{self, ExporterConfig};

#[derive(Debug, Parser)]
#[command(
    name = "varnish_exporter",
    about = "Prometheus exporter for varnishstat counters",
    version
)]
pub struct Cli {
    /// YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HTTP bind address (e.g. 0.0.0.0:9131 or :9131)
    #[arg(long)]
    pub bind: Option<String>,

    /// Print metrics once and exit
    #[arg(long)]
    pub check: bool,

    /// Do not call varnishadm to resolve the active VCL
    #[arg(long)]
    pub no_admin: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply flag overrides.
    pub fn load_config(&self) -> Result<ExporterConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_file(path)?,
            None => ExporterConfig::default(),
        };
        if let Some(bind) = &self.bind {
            cfg.exporter.listen = bind.clone();
        }
        if self.no_admin {
            cfg.exporter.no_admin = true;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
