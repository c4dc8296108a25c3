//! Batch progress tracking shared between worker threads

use crate::io::configuration::{MAX_INDIVIDUAL_PROGRESS_BARS, PROGRESS_BAR_WIDTH};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

static FILE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix:>24}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Files: [{{bar:{PROGRESS_BAR_WIDTH}.green/blue}}] {{pos}}/{{len}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates progress display for a conversion batch
///
/// The batch bar fills by one step per finished file. While at most
/// [`MAX_INDIVIDUAL_PROGRESS_BARS`] workers run, each file in flight also
/// gets its own bar counting written pyramid levels.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    show_file_bars: bool,
}

/// Progress handle for one file in flight
pub struct FileProgress {
    bar: Option<ProgressBar>,
}

impl FileProgress {
    /// Report `done` of `total` pyramid levels written
    pub fn set_levels(&self, done: u32, total: u32) {
        if let Some(ref bar) = self.bar {
            bar.set_length(u64::from(total));
            bar.set_position(u64::from(done));
            bar.set_message(format!("level {done}/{total}"));
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            show_file_bars: false,
        }
    }

    /// Set up the batch bar for `file_count` files processed by `workers` threads
    pub fn initialize(&mut self, file_count: usize, workers: usize) {
        let batch_bar = ProgressBar::new(file_count as u64);
        batch_bar.set_style(BATCH_STYLE.clone());
        self.batch_bar = Some(self.multi_progress.add(batch_bar));
        self.show_file_bars = workers <= MAX_INDIVIDUAL_PROGRESS_BARS;
    }

    /// Open a bar for a file that a worker is about to convert
    pub fn start_file(&self, path: &Path) -> FileProgress {
        if !self.show_file_bars {
            return FileProgress { bar: None };
        }

        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let bar = ProgressBar::new(0);
        bar.set_style(FILE_STYLE.clone());
        bar.set_prefix(display_name);
        FileProgress {
            bar: Some(self.multi_progress.add(bar)),
        }
    }

    /// Close a file's bar and advance the batch bar by one
    pub fn complete_file(&self, file: FileProgress) {
        if let Some(bar) = file.bar {
            bar.finish_and_clear();
            self.multi_progress.remove(&bar);
        }
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
    }

    /// Files finished so far
    pub fn completed(&self) -> u64 {
        self.batch_bar.as_ref().map_or(0, ProgressBar::position)
    }

    /// Run `f` with the bars hidden so console output is not torn
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.multi_progress.suspend(f)
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All files processed");
        }
        let _ = self.multi_progress.clear();
    }
}
