//! Input discovery and output naming for conversion batches

use crate::io::configuration::{
    DZI_EXTENSION, FALLBACK_STEM, JPEG_EXTENSION, LOG_FILE_PREFIX, LOG_TIMESTAMP_FORMAT,
    SUPPORTED_EXTENSIONS, TILES_DIR_SUFFIX,
};
use crate::io::error::{Result, WithPath};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Check whether a path carries one of the supported image extensions
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}

/// Expand command-line targets into the list of files to convert
///
/// File targets are kept in order whether or not they exist, so missing
/// sources surface as skipped outcomes. Directories contribute their
/// supported images, sorted, without recursing.
///
/// # Errors
///
/// Returns an error if a directory target cannot be read
pub fn collect_inputs(targets: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for target in targets {
        if target.is_dir() {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(target).with_path(target, "read directory")? {
                let path = entry.with_path(target, "read directory entry")?.path();
                if path.is_file() && has_supported_extension(&path) {
                    found.push(path);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(target.clone());
        }
    }

    Ok(files)
}

/// File name without its final extension
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Make a file stem safe for every common file system
///
/// Trailing dots and spaces are stripped, then anything other than
/// alphanumerics and `. _ - space` becomes `_`.
pub fn sanitize_file_stem(stem: &str) -> String {
    let trimmed = stem.trim_end_matches(['.', ' ']);
    let safe: String = trimmed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        safe
    }
}

/// Destination of a JPEG export
pub fn jpeg_output_path(out_dir: &Path, source: &Path) -> PathBuf {
    out_dir.join(format!(
        "{}.{JPEG_EXTENSION}",
        sanitize_file_stem(&base_name(source))
    ))
}

/// Destination of a DeepZoom descriptor
pub fn dzi_output_path(out_dir: &Path, source: &Path) -> PathBuf {
    out_dir.join(format!("{}.{DZI_EXTENSION}", base_name(source)))
}

/// Directory holding the pyramid levels that belong to a descriptor
pub fn tiles_dir_for(dzi_path: &Path) -> PathBuf {
    let name = format!("{}{TILES_DIR_SUFFIX}", base_name(dzi_path));
    dzi_path
        .parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

/// Check whether a path points at a network share (UNC path)
pub fn is_network_path(path: &Path) -> bool {
    let text = path.to_string_lossy();
    text.starts_with(r"\\") || text.starts_with("//")
}

/// Pick a worker count for a batch
///
/// Network shares get a single worker. Otherwise half the CPUs are used,
/// capped by the number of files.
pub fn auto_workers(files: &[PathBuf], out_dir: &Path, cpus: usize) -> usize {
    if files.is_empty() {
        return 1;
    }
    if is_network_path(out_dir) || files.iter().any(|file| is_network_path(file)) {
        return 1;
    }
    (cpus / 2).min(files.len()).max(1)
}

/// Location of the run log for a batch started at `started`
pub fn log_file_path(out_dir: Option<&Path>, started: &NaiveDateTime) -> PathBuf {
    let name = format!(
        "{LOG_FILE_PREFIX}{}.txt",
        started.format(LOG_TIMESTAMP_FORMAT)
    );
    out_dir.map_or_else(|| PathBuf::from(&name), |dir| dir.join(&name))
}
