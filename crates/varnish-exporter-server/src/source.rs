//! External collaborators that produce raw text (varnishstat, varnishadm).

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use varnish_exporter_core::error::{ExporterError, Result};

use crate::config::CommandSpec;

/// Raw text producer. One call per collection cycle.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;
    async fn read(&self) -> Result<String>;
}

/// Runs an external command with a bounded timeout and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            program: spec.program,
            args: spec.args,
            timeout: spec.timeout,
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

#[async_trait]
impl TextSource for CommandSource {
    fn name(&self) -> &str {
        &self.program
    }

    async fn read(&self) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(program = %self.program, args = ?self.args, "running source command");

        // Dropping the future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ExporterError::SourceTimeout {
                program: self.program.clone(),
                timeout_ms: self.timeout_ms(),
            })?
            .map_err(|e| ExporterError::SourceFailed(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            // varnishadm reports CLI errors on stdout
            let detail = if output.stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout)
            } else {
                String::from_utf8_lossy(&output.stderr)
            };
            return Err(ExporterError::SourceFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                detail.trim()
            )));
        }

        String::from_utf8(output.stdout).map_err(|e| {
            ExporterError::SourceFailed(format!("{}: output is not utf-8: {e}", self.program))
        })
    }
}
