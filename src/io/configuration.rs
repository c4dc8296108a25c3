//! Conversion constants and runtime configuration defaults

// DeepZoom pyramid settings
/// Edge length of a DeepZoom tile in pixels
pub const DEFAULT_TILE_SIZE: u32 = 256;
/// Pixels shared between neighbouring tiles
pub const DEFAULT_TILE_OVERLAP: u32 = 1;
/// Encoder quality for JPEG tiles (1-100)
pub const DEFAULT_TILE_QUALITY: u8 = 90;
/// Namespace written into every descriptor
pub const DZI_NAMESPACE: &str = "http://schemas.microsoft.com/deepzoom/2008";
/// Extension of the descriptor file
pub const DZI_EXTENSION: &str = "dzi";
/// Suffix of the directory holding the pyramid levels
pub const TILES_DIR_SUFFIX: &str = "_files";

// JPEG export settings
/// Encoder quality for exported JPEG files (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 95;
/// Extension of exported JPEG files
pub const JPEG_EXTENSION: &str = "jpg";
/// Replacement when a sanitized file stem ends up empty
pub const FALLBACK_STEM: &str = "image";

/// Source extensions picked up when a directory is given as target
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

// Run log settings
/// File name prefix of the per-run log
pub const LOG_FILE_PREFIX: &str = "converter_log_";
/// `chrono` format of the timestamp embedded in the log file name
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Default console filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "dzconvert=info";
/// Console filter used with `--verbose`
pub const VERBOSE_LOG_FILTER: &str = "dzconvert=debug,info";
/// Console filter used with `--quiet`
pub const QUIET_LOG_FILTER: &str = "dzconvert=warn";

// Worker pool
/// Worker count value that requests automatic sizing
pub const AUTO_WORKERS: usize = 0;
/// Fallback CPU count when the platform cannot report one
pub const FALLBACK_CPU_COUNT: usize = 4;

// Progress bar display settings
/// Threshold above which per-file bars are replaced by the batch bar alone
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 8;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
