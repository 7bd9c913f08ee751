use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use varnish_exporter_core::error::{ExporterError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub varnishstat: CommandSection,

    #[serde(default)]
    pub varnishadm: CommandSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            varnishstat: CommandSection::default(),
            varnishadm: CommandSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ExporterError::InvalidConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.exporter.validate()?;
        self.varnishstat.validate("varnishstat")?;
        self.varnishadm.validate("varnishadm")?;
        Ok(())
    }

    /// `varnishstat -j -t 0` unless overridden.
    pub fn stats_command(&self) -> CommandSpec {
        self.varnishstat.resolve("varnishstat", &["-j", "-t", "0"])
    }

    /// `varnishadm vcl.list -j` unless overridden.
    pub fn vcl_command(&self) -> CommandSpec {
        self.varnishadm.resolve("varnishadm", &["vcl.list", "-j"])
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Skip `varnishadm`; backend series then follow the first VCL seen.
    #[serde(default)]
    pub no_admin: bool,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            no_admin: false,
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    /// Parse `listen`. A bare `:port` binds all interfaces.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let raw = self.listen.trim();
        let full = if raw.starts_with(':') {
            format!("0.0.0.0{raw}")
        } else {
            raw.to_owned()
        };
        full.parse().map_err(|e| {
            ExporterError::InvalidConfig(format!("exporter.listen {:?}: {e}", self.listen))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:9131".into()
}

/// External command override. Unset `program`/`args` keep the built-in
/// command line for that collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSection {
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Option<Vec<String>>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CommandSection {
    fn default() -> Self {
        Self {
            program: None,
            args: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CommandSection {
    pub fn validate(&self, section: &str) -> Result<()> {
        if matches!(self.program.as_deref(), Some(p) if p.trim().is_empty()) {
            return Err(ExporterError::InvalidConfig(format!(
                "{section}.program must not be empty"
            )));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(ExporterError::InvalidConfig(format!(
                "{section}.timeout_ms must be between 100 and 60000"
            )));
        }
        Ok(())
    }

    fn resolve(&self, program: &str, args: &[&str]) -> CommandSpec {
        CommandSpec {
            program: self.program.clone().unwrap_or_else(|| program.to_owned()),
            args: self
                .args
                .clone()
                .unwrap_or_else(|| args.iter().map(|a| (*a).to_owned()).collect()),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Fully resolved command line for one collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}
