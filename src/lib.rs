//! ZipScale Library
//!
//! Streams the videos of a zip archive through an external transcoder, one entry at a
//! time, and collects the downscaled copies in a new archive.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{CleanupWarning, DomainError};
pub use domain::model::{ArchiveEntry, RunReport, RunSummary, TranscodeSettings, VideoFilter};
pub use error::{ZipScaleError, ZipScaleResult};
