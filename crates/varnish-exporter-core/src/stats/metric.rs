//! Counter key decomposition.
//!
//! A varnishstat key is a dot path such as `VBE.boot.default.happy` or
//! `MAIN.uptime`. The first segment selects a [`Category`]; the remaining
//! segments supply the metric name and, for most categories, one label.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Reserved top-level key carrying the document format version.
pub const VERSION_KEY: &str = "version";

/// Label set of one series. Ordered so rendering is deterministic.
pub type Labels = BTreeMap<&'static str, String>;

/// Closed set of counter families the exporter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `VBE.<vcl>.<backend>.<name>`
    Backend,
    /// `MEMPOOL.<pool>.<name>`
    Mempool,
    /// `SMA.<storage>.<name>`
    Sma,
    /// `LCK.<target>.<name>`
    Lock,
    /// `SMF.<storage>.<name>`
    Smf,
    /// `MAIN.<name>`
    Main,
    /// `MGT.<name>`
    Mgt,
}

impl Category {
    /// Classify by the first key segment (case-sensitive).
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "VBE" => Some(Category::Backend),
            "MEMPOOL" => Some(Category::Mempool),
            "SMA" => Some(Category::Sma),
            "LCK" => Some(Category::Lock),
            "SMF" => Some(Category::Smf),
            "MAIN" => Some(Category::Main),
            "MGT" => Some(Category::Mgt),
            _ => None,
        }
    }

    /// Category segment of the exported metric name.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Backend => "backend",
            Category::Mempool => "mempool",
            Category::Sma => "sma",
            Category::Lock => "lock",
            Category::Smf => "smf",
            Category::Main => "main",
            Category::Mgt => "mgt",
        }
    }
}

/// Exposition type derived from the counter's `flag` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    /// `"g"` is a gauge; every other flag (or none) is a counter.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "g" {
            MetricKind::Gauge
        } else {
            MetricKind::Counter
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// One exposition series, borrowing its counter node from the snapshot.
#[derive(Debug, Clone)]
pub struct Metric<'a> {
    pub category: Category,
    pub name: &'a str,
    pub labels: Labels,
    pub value: &'a Value,
}

impl<'a> Metric<'a> {
    pub fn new(category: Category, name: &'a str, labels: Labels, value: &'a Value) -> Self {
        Self {
            category,
            name,
            labels,
            value,
        }
    }

    /// `varnish_<category>_<name>`
    pub fn full_name(&self) -> String {
        format!("varnish_{}_{}", self.category.as_str(), self.name)
    }

    /// Missing or non-string descriptions read as empty.
    pub fn description(&self) -> &'a str {
        self.value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn kind(&self) -> MetricKind {
        let flag = self.value.get("flag").and_then(Value::as_str).unwrap_or_default();
        MetricKind::from_flag(flag)
    }

    /// Integer sample. Unsigned counters above `i64::MAX` are kept; anything
    /// that is not an integer reads as zero.
    pub fn sample(&self) -> i128 {
        let Some(v) = self.value.get("value") else {
            return 0;
        };
        v.as_i64()
            .map(i128::from)
            .or_else(|| v.as_u64().map(i128::from))
            .unwrap_or(0)
    }
}

/// Why a key produced no metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// First segment outside the known vocabulary.
    UnknownPrefix,
    /// Known prefix, but too few segments for its category.
    Truncated,
}

/// A key the generator could not turn into a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedKey {
    pub key: String,
    pub reason: SkipReason,
}

/// Result of one decomposition pass.
#[derive(Debug, Clone)]
pub struct Decomposition<'a> {
    /// Retained metrics, in source key order.
    pub metrics: Vec<Metric<'a>>,
    /// Keys reported instead of logged.
    pub skipped: Vec<SkippedKey>,
    /// The given active VCL, or the one adopted from the first backend key.
    pub active_revision: String,
}

fn label(name: &'static str, value: impl Into<String>) -> Labels {
    let mut labels = Labels::new();
    labels.insert(name, value.into());
    labels
}

/// Decompose every counter key into a [`Metric`].
///
/// Backend (`VBE`) keys carry a VCL name in their second segment. When
/// `active_revision` is empty, the first backend key visited fixes the active
/// VCL for the rest of the pass; backend keys of any other VCL are dropped.
/// Visiting order is the order of `counters`.
pub fn decompose<'a>(counters: &'a Map<String, Value>, active_revision: &str) -> Decomposition<'a> {
    let mut active = active_revision.to_owned();
    let mut metrics = Vec::with_capacity(counters.len());
    let mut skipped = Vec::new();

    for (key, node) in counters {
        if key == VERSION_KEY {
            continue;
        }
        let segments: Vec<&'a str> = key.split('.').collect();
        if segments.len() < 2 {
            continue;
        }

        let Some(category) = Category::from_prefix(segments[0]) else {
            skipped.push(SkippedKey {
                key: key.clone(),
                reason: SkipReason::UnknownPrefix,
            });
            continue;
        };

        let metric = match (category, segments.as_slice()) {
            (Category::Backend, [_, vcl, backend, name, ..]) => {
                if active.is_empty() {
                    tracing::debug!(vcl = %vcl, "adopting active vcl from first backend counter");
                    active = (*vcl).to_owned();
                }
                if *vcl != active {
                    continue;
                }
                Metric::new(category, *name, label("name", *backend), node)
            }
            (Category::Mempool, [_, pool, name, ..]) => {
                Metric::new(category, *name, label("name", *pool), node)
            }
            (Category::Sma, [_, storage, name, ..]) => {
                Metric::new(category, *name, label("type", storage.to_lowercase()), node)
            }
            (Category::Lock, [_, target, name, ..]) => {
                Metric::new(category, *name, label("target", *target), node)
            }
            (Category::Smf, [_, storage, name, ..]) => {
                Metric::new(category, *name, label("type", *storage), node)
            }
            (Category::Main | Category::Mgt, [_, name, ..]) => {
                Metric::new(category, *name, Labels::new(), node)
            }
            _ => {
                skipped.push(SkippedKey {
                    key: key.clone(),
                    reason: SkipReason::Truncated,
                });
                continue;
            }
        };
        metrics.push(metric);
    }

    Decomposition {
        metrics,
        skipped,
        active_revision: active,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    fn counters(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn node(flag: &str, value: i64) -> Value {
        json!({ "description": "d", "flag": flag, "value": value })
    }

    #[test]
    fn classifies_every_known_prefix() {
        let c = counters(json!({
            "VBE.boot.be1.conn": node("g", 1),
            "MEMPOOL.busyobj.live": node("g", 2),
            "SMA.Transient.g_bytes": node("g", 3),
            "LCK.ban.creat": node("c", 4),
            "SMF.s0.c_req": node("c", 5),
            "MAIN.uptime": node("c", 6),
            "MGT.child_start": node("c", 7),
        }));
        let d = decompose(&c, "boot");

        let got: Vec<(Category, &str, Vec<(&str, &str)>)> = d
            .metrics
            .iter()
            .map(|m| {
                let labels = m.labels.iter().map(|(k, v)| (*k, v.as_str())).collect();
                (m.category, m.name, labels)
            })
            .collect();

        assert_eq!(
            got,
            vec![
                (Category::Backend, "conn", vec![("name", "be1")]),
                (Category::Mempool, "live", vec![("name", "busyobj")]),
                (Category::Sma, "g_bytes", vec![("type", "transient")]),
                (Category::Lock, "creat", vec![("target", "ban")]),
                (Category::Smf, "c_req", vec![("type", "s0")]),
                (Category::Main, "uptime", vec![]),
                (Category::Mgt, "child_start", vec![]),
            ]
        );
        assert!(d.skipped.is_empty());
    }

    #[test]
    fn first_backend_vcl_wins_when_none_given() {
        let c = counters(json!({
            "VBE.a.be1.conn": node("g", 1),
            "VBE.b.be2.conn": node("g", 2),
        }));
        let d = decompose(&c, "");
        assert_eq!(d.active_revision, "a");
        assert_eq!(d.metrics.len(), 1);
        assert_eq!(d.metrics[0].labels["name"], "be1");
    }

    #[test]
    fn given_vcl_filters_other_backends() {
        let c = counters(json!({
            "VBE.a.be1.conn": node("g", 1),
            "VBE.b.be2.conn": node("g", 2),
        }));
        let d = decompose(&c, "b");
        assert_eq!(d.active_revision, "b");
        assert_eq!(d.metrics.len(), 1);
        assert_eq!(d.metrics[0].labels["name"], "be2");
    }

    #[test]
    fn version_and_single_segment_keys_are_ignored() {
        let c = counters(json!({
            "version": "1",
            "timestamp": "2024-01-01T00:00:00",
            "MAIN": node("c", 1),
        }));
        let d = decompose(&c, "");
        assert!(d.metrics.is_empty());
        assert!(d.skipped.is_empty());
    }

    #[test]
    fn unknown_and_truncated_keys_are_reported() {
        let c = counters(json!({
            "KVS.foo.bar": node("c", 1),
            "VBE.boot.be1": node("c", 1),
            "SMA.s0": node("c", 1),
        }));
        let d = decompose(&c, "boot");
        assert!(d.metrics.is_empty());
        assert_eq!(
            d.skipped,
            vec![
                SkippedKey { key: "KVS.foo.bar".into(), reason: SkipReason::UnknownPrefix },
                SkippedKey { key: "VBE.boot.be1".into(), reason: SkipReason::Truncated },
                SkippedKey { key: "SMA.s0".into(), reason: SkipReason::Truncated },
            ]
        );
    }

    #[test]
    fn field_defaults_for_broken_nodes() {
        let c = counters(json!({
            "MAIN.a": { "value": "nope" },
            "MAIN.b": 17,
            "MAIN.c": { "flag": "g", "value": u64::MAX },
            "MAIN.d": { "value": -3 },
        }));
        let d = decompose(&c, "");
        let m = &d.metrics;
        assert_eq!(m[0].description(), "");
        assert_eq!(m[0].kind(), MetricKind::Counter);
        assert_eq!(m[0].sample(), 0);
        assert_eq!(m[1].sample(), 0);
        assert_eq!(m[2].kind(), MetricKind::Gauge);
        assert_eq!(m[2].sample(), i128::from(u64::MAX));
        assert_eq!(m[3].sample(), -3);
    }
}
