//! ZipScale archive video converter
//!
//! Downscales every video inside a zip archive to a streaming-ready 720p copy and
//! writes the results, with the original directory layout, into a new archive.
//!
//! # Usage
//!
//! ```bash
//! zipscale convert --input footage.zip --output footage_720p.zip
//! zipscale inspect --input footage.zip --json
//! ```

use anyhow::Result;
use clap::Parser;

use zipscale_cli::cli::{commands, Cli};

/// Main entry point for the ZipScale CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::execute(cli).await
}
