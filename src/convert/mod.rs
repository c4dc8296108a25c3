/// Batch execution, outcomes and summaries
pub mod batch;
/// Source image decoding
pub mod decode;
/// DeepZoom descriptor and pyramid writer
pub mod deepzoom;
/// DeepZoom level and tile arithmetic
pub mod geometry;
/// RGB flattening and JPEG export
pub mod jpeg;
