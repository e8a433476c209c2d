//! CLI module for ZipScale
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{ConvertArgs, InspectArgs};

/// ZipScale archive video converter
///
/// Rewrites every video inside a zip archive as a smaller, streaming-ready copy in a
/// new archive, one video at a time.
#[derive(Parser, Debug)]
#[command(name = "zipscale")]
#[command(about = "ZipScale - Downscale the videos inside a zip archive")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, env = "ZIPSCALE_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, env = "ZIPSCALE_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Also append logs to this file
    #[arg(long, env = "ZIPSCALE_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every video in an archive into a new archive
    Convert(ConvertArgs),
    /// Show how each archive entry would be treated
    Inspect(InspectArgs),
}
