//! Shared error type across varnish-exporter crates.

use thiserror::Error;

/// Stable error codes, used as log fields and self-metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// VCL list had no `active` entry.
    NoActiveRevision,
    /// Input decoded but had the wrong shape.
    MalformedInput,
    /// Stats collaborator failed during a collection cycle.
    StatsUnavailable,
    /// VCL collaborator failed during a collection cycle.
    RevisionResolutionFailed,
    /// External command could not run or exited non-zero.
    SourceFailed,
    /// External command exceeded its timeout.
    SourceTimeout,
    /// Configuration rejected.
    InvalidConfig,
    /// Internal server error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoActiveRevision => "NO_ACTIVE_REVISION",
            ErrorCode::MalformedInput => "MALFORMED_INPUT",
            ErrorCode::StatsUnavailable => "STATS_UNAVAILABLE",
            ErrorCode::RevisionResolutionFailed => "REVISION_RESOLUTION_FAILED",
            ErrorCode::SourceFailed => "SOURCE_FAILED",
            ErrorCode::SourceTimeout => "SOURCE_TIMEOUT",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("no active vcl found")]
    NoActiveRevision,
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("stats unavailable: {0}")]
    StatsUnavailable(String),
    #[error("revision resolution failed: {0}")]
    RevisionResolutionFailed(String),
    #[error("source failed: {0}")]
    SourceFailed(String),
    #[error("source timed out: {program} after {timeout_ms}ms")]
    SourceTimeout { program: String, timeout_ms: u64 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ExporterError::NoActiveRevision => ErrorCode::NoActiveRevision,
            ExporterError::MalformedInput(_) => ErrorCode::MalformedInput,
            ExporterError::StatsUnavailable(_) => ErrorCode::StatsUnavailable,
            ExporterError::RevisionResolutionFailed(_) => ErrorCode::RevisionResolutionFailed,
            ExporterError::SourceFailed(_) => ErrorCode::SourceFailed,
            ExporterError::SourceTimeout { .. } => ErrorCode::SourceTimeout,
            ExporterError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            ExporterError::Internal(_) => ErrorCode::Internal,
        }
    }
}
