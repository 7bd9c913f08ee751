//! Prometheus text exposition (format 0.0.4).

use std::fmt::Write;

use super::metric::{Decomposition, Metric};

/// Name of the trailing series that reports the active VCL.
pub const ACTIVE_VCL_METRIC: &str = "varnish_active_vcl";

/// Escape a label value (`\`, `"`, newline).
pub fn escape_label_value(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape HELP text (`\`, newline).
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a label block: empty input gives `""`, otherwise
/// `{k1="v1",k2="v2"}`.
pub fn format_labels<'l, I>(labels: I) -> String
where
    I: IntoIterator<Item = (&'l str, &'l str)>,
{
    let pairs = labels
        .into_iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect::<Vec<_>>();
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", pairs.join(","))
    }
}

fn render_metric(m: &Metric<'_>, out: &mut String) {
    let name = m.full_name();
    let labels = format_labels(m.labels.iter().map(|(k, v)| (*k, v.as_str())));
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(m.description()));
    let _ = writeln!(out, "# TYPE {} {}", name, m.kind().as_str());
    let _ = writeln!(out, "{}{} {}", name, labels, m.sample());
}

/// Trailing gauge, always emitted, even for an empty VCL name.
fn render_active_vcl(active_revision: &str, out: &mut String) {
    let _ = writeln!(out, "# HELP {} vcl version", ACTIVE_VCL_METRIC);
    let _ = writeln!(out, "# TYPE {} gauge", ACTIVE_VCL_METRIC);
    let labels = format_labels([("version", active_revision)]);
    let _ = writeln!(out, "{}{} 1", ACTIVE_VCL_METRIC, labels);
}

/// Render every metric in order, then the active VCL series.
pub fn render(d: &Decomposition<'_>) -> String {
    let mut out = String::with_capacity(d.metrics.len() * 128);
    for m in &d.metrics {
        render_metric(m, &mut out);
    }
    render_active_vcl(&d.active_revision, &mut out);
    out
}
