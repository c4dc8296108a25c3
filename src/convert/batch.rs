//! Batch execution across worker threads with per-run logging

use crate::convert::deepzoom::{DeepZoomCreator, DeepZoomSettings};
use crate::convert::jpeg::{JpegExporter, JpegSettings};
use crate::io::configuration::{AUTO_WORKERS, FALLBACK_CPU_COUNT};
use crate::io::error::{ConvertError, Result, WithPath};
use crate::io::logging::RunLog;
use crate::io::paths::{
    auto_workers, dzi_output_path, is_network_path, jpeg_output_path, log_file_path,
};
use crate::io::progress::{FileProgress, ProgressManager};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{Level, debug, info, warn};

/// Conversion applied to every file of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Flatten and save as JPEG
    Jpeg,
    /// Build a DeepZoom pyramid
    DeepZoom,
}

impl Task {
    /// Prefix of every log line for this task
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Jpeg => "[JPEG]",
            Self::DeepZoom => "[DZI]",
        }
    }

    /// Main output file produced for `source`
    pub fn output_path(self, out_dir: &Path, source: &Path) -> PathBuf {
        match self {
            Self::Jpeg => jpeg_output_path(out_dir, source),
            Self::DeepZoom => dzi_output_path(out_dir, source),
        }
    }

    /// Input indices grouped by the output they write
    ///
    /// Groups appear in order of their first member and keep input order
    /// inside. Outputs are compared case-insensitively, as on Windows.
    pub fn group_by_output(self, inputs: &[PathBuf], out_dir: &Path) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut by_output: HashMap<String, usize> = HashMap::with_capacity(inputs.len());

        for (index, source) in inputs.iter().enumerate() {
            let key = self
                .output_path(out_dir, source)
                .to_string_lossy()
                .to_lowercase();
            match by_output.get(&key).and_then(|&group| groups.get_mut(group)) {
                Some(group) => group.push(index),
                None => {
                    by_output.insert(key, groups.len());
                    groups.push(vec![index]);
                }
            }
        }

        groups
    }
}

/// Why a file was not converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The source path does not exist
    NotFound,
    /// The output already exists and skipping was requested
    OutputExists(PathBuf),
}

/// Result of converting one file
#[derive(Debug)]
pub enum FileStatus {
    /// Output written
    Converted {
        /// Path of the JPEG or descriptor
        output: PathBuf,
        /// Time spent on this file
        elapsed: Duration,
    },
    /// Nothing written
    Skipped(SkipReason),
    /// Conversion failed; the rest of the batch carried on
    Failed(ConvertError),
}

/// One processed file
#[derive(Debug)]
pub struct FileOutcome {
    /// Position of the file in the input list
    pub index: usize,
    /// Source path
    pub source: PathBuf,
    /// What happened
    pub status: FileStatus,
}

/// Totals and details of a finished batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Files converted
    pub converted: usize,
    /// Files skipped
    pub skipped: usize,
    /// Files that failed
    pub failed: usize,
    /// Wall time of the whole batch
    pub elapsed: Duration,
    /// Worker threads used
    pub workers: usize,
    /// Per-file outcomes in completion order
    pub outcomes: Vec<FileOutcome>,
    /// Everything recorded for the run
    pub log: RunLog,
    /// Where the run log was written, if it was
    pub log_path: Option<PathBuf>,
}

impl BatchSummary {
    /// Whether no file failed
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Outcome for the file at `index` in the input list
    pub fn outcome_for(&self, index: usize) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|outcome| outcome.index == index)
    }
}

/// Knobs for a batch run
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Worker threads; [`AUTO_WORKERS`] sizes the pool automatically
    pub workers: usize,
    /// Leave files alone whose output already exists
    pub skip_existing: bool,
    /// Write the run log into the output directory
    pub write_log: bool,
    /// JPEG export settings
    pub jpeg: JpegSettings,
    /// DeepZoom settings
    pub deepzoom: DeepZoomSettings,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: AUTO_WORKERS,
            skip_existing: false,
            write_log: true,
            jpeg: JpegSettings::default(),
            deepzoom: DeepZoomSettings::default(),
        }
    }
}

/// Number of CPUs reported by the platform
pub fn available_cpus() -> usize {
    std::thread::available_parallelism().map_or(FALLBACK_CPU_COUNT, NonZeroUsize::get)
}

/// Runs one conversion task over a list of files
pub struct BatchRunner {
    options: BatchOptions,
    progress_manager: Option<ProgressManager>,
}

impl BatchRunner {
    /// Create a runner, optionally drawing progress bars
    pub fn new(options: BatchOptions, show_progress: bool) -> Self {
        Self {
            options,
            progress_manager: show_progress.then(ProgressManager::new),
        }
    }

    /// Options in use
    pub const fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Worker count for `files`, resolving automatic sizing
    pub fn resolve_workers(&self, files: &[PathBuf], out_dir: &Path) -> usize {
        if self.options.workers == AUTO_WORKERS {
            auto_workers(files, out_dir, available_cpus())
        } else {
            self.options.workers.min(files.len()).max(1)
        }
    }

    /// Convert every file in `inputs` into `out_dir`
    ///
    /// Per-file failures are recorded in the summary and never stop the
    /// batch. The run log is written once all files are done.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid, the output directory
    /// cannot be created, or the run log cannot be written
    pub fn run(&mut self, task: Task, inputs: &[PathBuf], out_dir: &Path) -> Result<BatchSummary> {
        match task {
            Task::Jpeg => self.options.jpeg.validate()?,
            Task::DeepZoom => self.options.deepzoom.validate()?,
        }

        if inputs.is_empty() {
            info!("{} No input files", task.tag());
            return Ok(BatchSummary::default());
        }

        let started_at = chrono::Local::now().naive_local();
        let clock = Instant::now();
        std::fs::create_dir_all(out_dir).with_path(out_dir, "create directory")?;

        let groups = task.group_by_output(inputs, out_dir);
        let workers = self.resolve_workers(inputs, out_dir).min(groups.len()).max(1);
        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(inputs.len(), workers);
        }

        let options = &self.options;
        let progress = self.progress_manager.as_ref();
        let mut summary = BatchSummary {
            workers,
            outcomes: Vec::with_capacity(inputs.len()),
            ..BatchSummary::default()
        };

        note(&mut summary.log, progress, Level::INFO, settings_line(task, options));
        note(
            &mut summary.log,
            progress,
            Level::INFO,
            workers_line(task, options.workers, workers, inputs, out_dir),
        );

        for group in groups.iter().filter(|group| group.len() > 1) {
            note(
                &mut summary.log,
                progress,
                Level::WARN,
                shared_output_line(task, inputs, group, out_dir),
            );
        }

        let next_group = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel::<(FileOutcome, Option<FileProgress>)>();

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let next_group = &next_group;
                let groups = &groups;
                // Inputs sharing an output stay on one worker, last one wins
                scope.spawn(move || {
                    while let Some(group) = groups.get(next_group.fetch_add(1, Ordering::Relaxed))
                    {
                        for &index in group {
                            let Some(source) = inputs.get(index) else {
                                continue;
                            };
                            let file_progress = progress.map(|pm| pm.start_file(source));
                            let status = convert_file(
                                task,
                                options,
                                source,
                                out_dir,
                                file_progress.as_ref(),
                            );
                            let outcome = FileOutcome {
                                index,
                                source: source.clone(),
                                status,
                            };
                            if sender.send((outcome, file_progress)).is_err() {
                                return;
                            }
                        }
                    }
                });
            }
            drop(sender);

            for (outcome, file_progress) in receiver {
                if let (Some(pm), Some(file_progress)) = (progress, file_progress) {
                    pm.complete_file(file_progress);
                }
                let (level, line) = outcome_line(task, &outcome);
                note(&mut summary.log, progress, level, line);
                match outcome.status {
                    FileStatus::Converted { .. } => summary.converted += 1,
                    FileStatus::Skipped(_) => summary.skipped += 1,
                    FileStatus::Failed(_) => summary.failed += 1,
                }
                summary.outcomes.push(outcome);
            }
        });

        summary.elapsed = clock.elapsed();
        note(
            &mut summary.log,
            progress,
            Level::INFO,
            format!(
                "{} Done. Converted: {}, Skipped: {}, Errors: {}, Elapsed: {:.2}s",
                task.tag(),
                summary.converted,
                summary.skipped,
                summary.failed,
                summary.elapsed.as_secs_f64()
            ),
        );

        if let Some(pm) = progress {
            pm.finish();
        }

        if options.write_log {
            let path = log_file_path(Some(out_dir), &started_at);
            summary.log.write_to(&path)?;
            debug!("Run log written to {}", path.display());
            summary.log_path = Some(path);
        }

        Ok(summary)
    }
}

fn convert_file(
    task: Task,
    options: &BatchOptions,
    source: &Path,
    out_dir: &Path,
    file_progress: Option<&FileProgress>,
) -> FileStatus {
    if !source.exists() {
        return FileStatus::Skipped(SkipReason::NotFound);
    }

    let output = task.output_path(out_dir, source);
    if options.skip_existing && output.exists() {
        return FileStatus::Skipped(SkipReason::OutputExists(output));
    }

    let started = Instant::now();
    let result = match task {
        Task::Jpeg => JpegExporter::new(options.jpeg).export(source, out_dir),
        Task::DeepZoom => DeepZoomCreator::new(options.deepzoom)
            .create(source, &output, |done, total| {
                if let Some(file_progress) = file_progress {
                    file_progress.set_levels(done, total);
                }
            })
            .map(|_| output),
    };

    match result {
        Ok(output) => FileStatus::Converted {
            output,
            elapsed: started.elapsed(),
        },
        Err(error) => FileStatus::Failed(error),
    }
}

fn settings_line(task: Task, options: &BatchOptions) -> String {
    match task {
        Task::Jpeg => format!("{} Settings: quality={}", task.tag(), options.jpeg.quality),
        Task::DeepZoom => {
            let settings = options.deepzoom;
            format!(
                "{} Settings: tile_size={}, overlap={}, format={}, quality={}, filter=Lanczos3",
                task.tag(),
                settings.tile_size,
                settings.overlap,
                settings.format,
                settings.quality
            )
        }
    }
}

fn workers_line(
    task: Task,
    requested: usize,
    resolved: usize,
    inputs: &[PathBuf],
    out_dir: &Path,
) -> String {
    if requested == AUTO_WORKERS {
        let network = is_network_path(out_dir) || inputs.iter().any(|file| is_network_path(file));
        format!(
            "{} Workers (auto): {resolved} (network path: {}, CPUs: {})",
            task.tag(),
            if network { "yes" } else { "no" },
            available_cpus()
        )
    } else {
        format!("{} Workers: {resolved}", task.tag())
    }
}

fn shared_output_line(
    task: Task,
    inputs: &[PathBuf],
    group: &[usize],
    out_dir: &Path,
) -> String {
    let sources: Vec<String> = group
        .iter()
        .filter_map(|&index| inputs.get(index))
        .map(|source| source.display().to_string())
        .collect();
    let output = group
        .first()
        .and_then(|&index| inputs.get(index))
        .map(|source| task.output_path(out_dir, source))
        .unwrap_or_default();
    format!(
        "{} Shared output: {} <= {} (converted in order, last one kept)",
        task.tag(),
        output.display(),
        sources.join(", ")
    )
}

fn outcome_line(task: Task, outcome: &FileOutcome) -> (Level, String) {
    let tag = task.tag();
    let source = outcome.source.display();
    match &outcome.status {
        FileStatus::Converted { output, elapsed } => {
            let verb = match task {
                Task::Jpeg => "Saved",
                Task::DeepZoom => "Created",
            };
            (
                Level::INFO,
                format!(
                    "{tag} {verb}: {} ({:.2}s)",
                    output.display(),
                    elapsed.as_secs_f64()
                ),
            )
        }
        FileStatus::Skipped(SkipReason::NotFound) => {
            (Level::WARN, format!("{tag} Skipped (not found): {source}"))
        }
        FileStatus::Skipped(SkipReason::OutputExists(output)) => (
            Level::INFO,
            format!("{tag} Skipped (output exists): {}", output.display()),
        ),
        FileStatus::Failed(error) => (Level::WARN, format!("{tag} Error: {source} => {error}")),
    }
}

// Record a line in the run log and echo it to the console
fn note(log: &mut RunLog, progress: Option<&ProgressManager>, level: Level, line: String) {
    let emit = || {
        if level == Level::WARN {
            warn!("{line}");
        } else {
            info!("{line}");
        }
    };
    match progress {
        Some(pm) => pm.suspend(emit),
        None => emit(),
    }
    log.record(line);
}
