//! In-memory collaborators shared by server tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use varnish_exporter_core::error::{ExporterError, Result};
use varnish_exporter_server::source::TextSource;

/// Returns the same text on every read and counts reads.
pub struct FixedSource {
    text: String,
    reads: AtomicUsize,
}

impl FixedSource {
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: text.into(),
            reads: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn read(&self) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Always fails like a command exiting non-zero.
pub struct FailingSource;

#[async_trait]
impl TextSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn read(&self) -> Result<String> {
        Err(ExporterError::SourceFailed("varnishstat exited with exit status: 1: Could not get hold of varnishd".into()))
    }
}

pub const STATS: &str = r#"{
  "version": "1",
  "MAIN.uptime": {"description": "Child process uptime", "flag": "c", "value": 42},
  "VBE.boot.be1.conn": {"description": "Concurrent connections", "flag": "g", "value": 3},
  "VBE.reload_1.be2.conn": {"description": "Concurrent connections", "flag": "g", "value": 5},
  "XYZ.foo.bar": {"description": "?", "flag": "c", "value": 1}
}"#;

pub const VCL_LIST: &str = r#"[2, ["vcl.list", "-j"], 1709288142.482,
  {"status": "available", "state": "auto", "temperature": "cold", "busy": 0, "name": "boot"},
  {"status": "active", "state": "auto", "temperature": "warm", "busy": 1, "name": "reload_1"}
]"#;
