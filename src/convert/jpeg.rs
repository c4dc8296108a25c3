//! JPEG export with alpha flattening onto white

use crate::convert::decode::open_image;
use crate::io::configuration::DEFAULT_JPEG_QUALITY;
use crate::io::error::{ConvertError, Result, WithPath, invalid_parameter};
use crate::io::paths::jpeg_output_path;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage, Rgba};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Settings for JPEG export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegSettings {
    /// Encoder quality (1-100)
    pub quality: u8,
}

impl Default for JpegSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl JpegSettings {
    /// Check that the quality is within the encoder's range
    ///
    /// # Errors
    ///
    /// Returns an error if the quality is outside 1-100
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)
    }
}

/// Check an encoder quality value
///
/// # Errors
///
/// Returns an error if the quality is outside 1-100
pub fn validate_quality(quality: u8) -> Result<()> {
    if (1..=100).contains(&quality) {
        Ok(())
    } else {
        Err(invalid_parameter(
            "quality",
            &quality,
            &"quality must be between 1 and 100",
        ))
    }
}

// Composite one channel over white
const fn over_white(channel: u8, alpha: u8) -> u8 {
    let alpha = alpha as u16;
    ((channel as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

/// Reduce any image to 8-bit RGB
///
/// Transparent areas are composited onto a white background; palette, grey,
/// 16-bit and float images are converted channel-wise.
pub fn flatten_to_rgb(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

/// Encode an RGB image as a JPEG file
///
/// # Errors
///
/// Returns an error if the file cannot be created or encoding fails
pub fn write_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path).with_path(path, "create file")?;
    let mut writer = BufWriter::new(file);

    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(image)
        .map_err(|source| ConvertError::ImageExport {
            path: path.to_path_buf(),
            source,
        })?;

    writer.flush().with_path(path, "write file")
}

/// Converts source images into standalone JPEG files
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegExporter {
    settings: JpegSettings,
}

impl JpegExporter {
    /// Create an exporter with the given settings
    pub const fn new(settings: JpegSettings) -> Self {
        Self { settings }
    }

    /// Settings in use
    pub const fn settings(&self) -> JpegSettings {
        self.settings
    }

    /// Export `source` into `out_dir`, returning the written path
    ///
    /// # Errors
    ///
    /// Returns an error if decoding, the output directory, or encoding fails
    pub fn export(&self, source: &Path, out_dir: &Path) -> Result<PathBuf> {
        let image = open_image(source)?;
        let rgb = flatten_to_rgb(&image);
        drop(image);

        std::fs::create_dir_all(out_dir).with_path(out_dir, "create directory")?;
        let output = jpeg_output_path(out_dir, source);
        write_jpeg(&rgb, &output, self.settings.quality)?;
        Ok(output)
    }
}
