//! varnishstat snapshot to exposition text.
//!
//! - [`metric`]: key decomposition into category/name/labels.
//! - [`render`]: Prometheus text rendering.
//!
//! The pipeline is a pure function of the counters map and the active VCL
//! name. Keys that cannot be classified are returned to the caller rather
//! than logged here.

pub mod metric;
pub mod render;

use serde_json::{Map, Value};

use crate::error::{ExporterError, Result};

pub use metric::{decompose, Category, Decomposition, Metric, MetricKind, SkipReason, SkippedKey};
pub use render::{format_labels, render, ACTIVE_VCL_METRIC};

/// Key under which newer varnishstat releases nest the counters.
const NESTED_COUNTERS_KEY: &str = "counters";

/// Rendered output of one collection cycle.
#[derive(Debug, Clone)]
pub struct Exposition {
    /// Full exposition body.
    pub text: String,
    /// VCL the backend series were filtered by (possibly empty).
    pub active_revision: String,
    /// Keys that produced no metric.
    pub skipped: Vec<SkippedKey>,
}

/// Decode `varnishstat -j` output into the flat counters map.
///
/// Accepts both the flat layout (counters at the top level next to
/// `version`) and the nested one (`{"version":1,"counters":{...}}`).
pub fn decode_counters(text: &str) -> Result<Map<String, Value>> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| ExporterError::MalformedInput(format!("invalid stats json: {e}")))?;
    let Value::Object(mut top) = doc else {
        return Err(ExporterError::MalformedInput(
            "stats document is not a json object".into(),
        ));
    };
    if let Some(Value::Object(nested)) = top.get_mut(NESTED_COUNTERS_KEY) {
        return Ok(std::mem::take(nested));
    }
    Ok(top)
}

/// Decompose and render a counters map.
pub fn generate(counters: &Map<String, Value>, active_revision: &str) -> Exposition {
    let d = decompose(counters, active_revision);
    let text = render(&d);
    Exposition {
        text,
        active_revision: d.active_revision,
        skipped: d.skipped,
    }
}
