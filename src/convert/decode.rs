//! Source image decoding

use crate::io::error::{ConvertError, Result, WithPath, invalid_source};
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Decode the first frame of an image file
///
/// The format is sniffed from the file contents rather than trusted from the
/// extension, and decoder allocation limits are lifted so very large scans
/// (multi-gigapixel TIFFs) load.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, its format is unknown,
/// decoding fails, or the decoded image has no pixels
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let mut reader = ImageReader::open(path)
        .with_path(path, "open image")?
        .with_guessed_format()
        .with_path(path, "detect image format")?;
    reader.no_limits();

    let image = reader.decode().map_err(|source| ConvertError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(invalid_source(path, &"image has no pixels"));
    }

    Ok(image)
}
