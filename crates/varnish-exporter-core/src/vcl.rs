//! Active VCL resolution from `varnishadm vcl.list -j`.
//!
//! The JSON output is an array whose first entries describe the CLI call
//! (protocol version, argv, timestamp); the VCL records follow:
//!
//! ```json
//! [2, ["vcl.list", "-j"], 1700000000.123,
//!   {"status": "available", "name": "reload_1", ...},
//!   {"status": "active", "name": "boot", ...}]
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExporterError, Result};

/// Leading metadata entries before the first VCL record.
pub const VCL_LIST_HEADER_ENTRIES: usize = 3;

/// Status of a loaded VCL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VclStatus {
    Active,
    Available,
    Discarded,
    #[default]
    #[serde(other)]
    Other,
}

/// One VCL record. Extra fields (`state`, `temperature`, `busy`, ...) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VclRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: VclStatus,
}

/// Decode the record part of a `vcl.list -j` dump, in listing order.
pub fn parse_vcl_list(input: &str) -> Result<Vec<VclRecord>> {
    let entries: Vec<Value> = serde_json::from_str(input)
        .map_err(|e| ExporterError::MalformedInput(format!("invalid vcl list: {e}")))?;

    entries
        .iter()
        .enumerate()
        .skip(VCL_LIST_HEADER_ENTRIES)
        .map(|(idx, entry)| {
            VclRecord::deserialize(entry).map_err(|e| {
                ExporterError::MalformedInput(format!("vcl list entry {idx}: {e}"))
            })
        })
        .collect()
}

/// Name of the first `active` VCL in the listing.
pub fn resolve_active_revision(input: &str) -> Result<String> {
    parse_vcl_list(input)?
        .into_iter()
        .find(|r| r.status == VclStatus::Active)
        .map(|r| r.name)
        .ok_or(ExporterError::NoActiveRevision)
}
