//! Console diagnostics and the per-run text log

use crate::io::configuration::{DEFAULT_LOG_FILTER, QUIET_LOG_FILTER, VERBOSE_LOG_FILTER};
use crate::io::error::{Result, WithPath};
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global console subscriber
///
/// `RUST_LOG` takes precedence over the flags. Calling this twice is harmless:
/// the second installation is ignored.
pub fn init_console_logging(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        VERBOSE_LOG_FILTER
    } else if quiet {
        QUIET_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// Ordered record of everything reported during one batch
#[derive(Debug, Default, Clone)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    /// Create an empty log
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append a line
    pub fn record(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Recorded lines in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of recorded lines
    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing was recorded
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Full log text, one line per record
    pub fn contents(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    /// Write the log to `path`, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
        }
        std::fs::write(path, self.contents()).with_path(path, "write log")
    }
}
