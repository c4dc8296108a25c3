//! Command-line interface for batch JPEG and DeepZoom conversion

use crate::convert::batch::{BatchOptions, BatchRunner, BatchSummary, Task};
use crate::convert::deepzoom::{DeepZoomSettings, TileFormat};
use crate::convert::jpeg::JpegSettings;
use crate::io::configuration::{
    AUTO_WORKERS, DEFAULT_JPEG_QUALITY, DEFAULT_TILE_OVERLAP, DEFAULT_TILE_QUALITY,
    DEFAULT_TILE_SIZE,
};
use crate::io::error::Result;
use crate::io::paths::collect_inputs;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "dzconvert")]
#[command(
    author,
    version,
    about = "Convert TIFF/JPEG images to JPEG files or DeepZoom (.dzi) pyramids"
)]
/// Command-line arguments for the converter
pub struct Cli {
    /// Conversion to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress bars and informational console output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show debug console output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

/// Available conversions
#[derive(Subcommand)]
pub enum Command {
    /// Save every input as a high-quality JPEG
    Jpeg {
        /// Inputs and output location
        #[command(flatten)]
        common: CommonArgs,

        /// JPEG quality (1-100)
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },

    /// Create a DeepZoom descriptor and tile pyramid for every input
    Dzi {
        /// Inputs and output location
        #[command(flatten)]
        common: CommonArgs,

        /// Tile edge length in pixels
        #[arg(short, long, default_value_t = DEFAULT_TILE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
        tile_size: u32,

        /// Pixels shared between neighbouring tiles
        #[arg(long, default_value_t = DEFAULT_TILE_OVERLAP)]
        overlap: u32,

        /// Tile encoding
        #[arg(short, long, value_enum, default_value_t = TileFormat::Jpg)]
        format: TileFormat,

        /// JPEG tile quality (1-100)
        #[arg(long, default_value_t = DEFAULT_TILE_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },
}

/// Arguments shared by every conversion
#[derive(Args)]
pub struct CommonArgs {
    /// Image files or directories of images to convert
    #[arg(value_name = "TARGET", required = true, num_args = 1..)]
    pub targets: Vec<PathBuf>,

    /// Directory receiving the converted files and the run log
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Worker threads (0 picks automatically)
    #[arg(short, long, default_value_t = AUTO_WORKERS)]
    pub workers: usize,

    /// Skip inputs whose output already exists
    #[arg(short, long)]
    pub skip_existing: bool,

    /// Do not write the run log file
    #[arg(long)]
    pub no_log: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Conversion selected on the command line
    pub const fn task(&self) -> Task {
        match self.command {
            Command::Jpeg { .. } => Task::Jpeg,
            Command::Dzi { .. } => Task::DeepZoom,
        }
    }

    /// Arguments shared by every conversion
    pub fn common(&self) -> &CommonArgs {
        match self.command {
            Command::Jpeg { ref common, .. } | Command::Dzi { ref common, .. } => common,
        }
    }

    /// Batch options assembled from the arguments
    pub fn batch_options(&self) -> BatchOptions {
        let common = self.common();
        let mut options = BatchOptions {
            workers: common.workers,
            skip_existing: common.skip_existing,
            write_log: !common.no_log,
            ..BatchOptions::default()
        };

        match self.command {
            Command::Jpeg { quality, .. } => {
                options.jpeg = JpegSettings { quality };
            }
            Command::Dzi {
                tile_size,
                overlap,
                format,
                quality,
                ..
            } => {
                options.deepzoom = DeepZoomSettings {
                    tile_size,
                    overlap,
                    format,
                    quality,
                };
            }
        }

        options
    }
}

/// Orchestrates one conversion run from parsed arguments
pub struct FileProcessor {
    cli: Cli,
    runner: BatchRunner,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let runner = BatchRunner::new(cli.batch_options(), cli.should_show_progress());
        Self { cli, runner }
    }

    /// Collect the targets and convert them
    ///
    /// # Errors
    ///
    /// Returns an error if a target directory cannot be read, the settings
    /// are invalid, or the output directory or run log cannot be written
    pub fn process(&mut self) -> Result<BatchSummary> {
        let common = self.cli.common();
        let files = collect_inputs(&common.targets)?;
        info!("{} {} file(s) selected", self.cli.task().tag(), files.len());

        let summary = self.runner.run(self.cli.task(), &files, &common.output)?;

        if let Some(ref path) = summary.log_path {
            info!("Log written to {}", path.display());
        }
        Ok(summary)
    }
}
