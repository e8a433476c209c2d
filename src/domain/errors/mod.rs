// Domain errors - Per-item failure taxonomy for the conversion pipeline

use std::fmt;

/// Errors that end a single item's lifecycle without aborting the run
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The named entry could not be materialized in scratch storage
    ExtractionFailed { path: String, reason: String },
    /// The transcoder exited non-zero, timed out, or left no output behind
    TransformFailed { input: String, diagnostic: String },
    /// The converted file could not be added to the destination archive
    AppendFailed { path: String, reason: String },
    /// Resolution probing failed (never fatal to an item)
    ProbeFailed(String),
    /// Invalid arguments provided
    BadArgs(String),
}

impl DomainError {
    /// Short machine-friendly label used in run reports
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::ExtractionFailed { .. } => "extraction_failed",
            DomainError::TransformFailed { .. } => "transform_failed",
            DomainError::AppendFailed { .. } => "append_failed",
            DomainError::ProbeFailed(_) => "probe_failed",
            DomainError::BadArgs(_) => "bad_args",
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::ExtractionFailed { path, reason } => {
                write!(f, "Extraction failed for {}: {}", path, reason)
            }
            DomainError::TransformFailed { input, diagnostic } => {
                write!(f, "Transform failed for {}: {}", input, diagnostic)
            }
            DomainError::AppendFailed { path, reason } => {
                write!(f, "Append failed for {}: {}", path, reason)
            }
            DomainError::ProbeFailed(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

/// A scratch file that could not be removed after its item finished
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupWarning {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not remove scratch file {}: {}", self.path, self.reason)
    }
}
