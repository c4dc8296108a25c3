//! CLI entry point for the DeepZoom converter

use clap::Parser;
use dzconvert::io::cli::{Cli, FileProcessor};
use dzconvert::io::logging::init_console_logging;
use std::process::ExitCode;

fn main() -> dzconvert::Result<ExitCode> {
    let cli = Cli::parse();
    init_console_logging(cli.verbose, cli.quiet);

    let mut processor = FileProcessor::new(cli);
    let summary = processor.process()?;

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
