//! varnish-exporter core: counter decomposition, exposition rendering, and
//! active VCL resolution.
//!
//! This crate turns a `varnishstat -j` snapshot into Prometheus text and
//! picks the active VCL out of a `varnishadm vcl.list -j` dump. It carries no
//! process, runtime, or HTTP dependencies; every function is a pure function
//! of its inputs so concurrent scrapes never share state.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed counters
//! degrade to default values or diagnostics; malformed documents surface as
//! `ExporterError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod stats;
pub mod vcl;

/// Shared result type.
pub use error::{ErrorCode, ExporterError, Result};
pub use stats::{decode_counters, generate, Exposition};
pub use vcl::resolve_active_revision;
