//! Error handling module for ZipScale

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Fatal errors that abort a run before any item is processed
#[derive(Error, Debug)]
pub enum ZipScaleError {
    /// Source archive missing, unreadable, or not a zip
    #[error("Source archive is unreadable: {path}: {message}")]
    ArchiveUnreadable { path: String, message: String },

    /// Destination archive could not be created
    #[error("Cannot create destination archive {path}: {message}")]
    DestinationUnwritable { path: String, message: String },

    /// Source and destination resolve to the same file
    #[error("Destination archive must differ from the source archive: {path}")]
    SameArchive { path: String },

    /// External transcoder missing or not runnable
    #[error("Transform tool unavailable ({tool}): {message}")]
    ToolUnavailable { tool: String, message: String },

    /// Scratch directory could not be prepared
    #[error("Scratch directory unavailable at {path}: {message}")]
    ScratchUnavailable { path: String, message: String },

    /// Invalid configuration value or file
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// Run report could not be written
    #[error("Failed to write run report: {message}")]
    ReportError { message: String },

    /// Domain error surfaced outside the per-item boundary
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for ZipScale operations
pub type ZipScaleResult<T> = std::result::Result<T, ZipScaleError>;
