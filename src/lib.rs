//! Batch conversion of large raster images into JPEG files and DeepZoom pyramids
//!
//! Each input is decoded, flattened to RGB where needed, and either saved as a
//! JPEG or sliced into a `.dzi` descriptor with a tiled multi-resolution
//! pyramid for DeepZoom viewers. Batches run on a small worker pool and leave
//! a text log of every run in the output directory.

#![forbid(unsafe_code)]

/// Pyramid geometry, encoders and the batch runner
pub mod convert;
/// Command line, configuration, errors, logging and progress display
pub mod io;

pub use convert::batch::{BatchOptions, BatchRunner, BatchSummary, FileStatus, Task};
pub use convert::deepzoom::{DeepZoomCreator, DeepZoomDescriptor, DeepZoomSettings, TileFormat};
pub use io::error::{ConvertError, Result};
