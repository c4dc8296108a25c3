/// Command-line parsing and the run entry point
pub mod cli;
/// Conversion defaults and display settings
pub mod configuration;
/// Error types and path context
pub mod error;
/// Console logging and the per-run log file
pub mod logging;
/// Input discovery and output naming
pub mod paths;
/// Batch and per-file progress bars
pub mod progress;
