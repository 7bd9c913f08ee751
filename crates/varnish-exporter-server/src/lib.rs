//! varnish-exporter server library entry.
//!
//! This crate wires config, the external varnish collaborators, the
//! collection cycle, and the HTTP surface into the exporter. It is consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod cli;
pub mod collect;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod source;
