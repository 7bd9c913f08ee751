//! Exporter self-observability.
//!
//! Scrape outcomes are counted in-process and rendered on
//! `/exporter/metrics`, separate from the varnish series on `/metrics`.

pub mod metrics;

pub use metrics::ExporterMetrics;
