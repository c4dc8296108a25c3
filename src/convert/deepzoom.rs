//! DeepZoom pyramid creation and descriptor handling

use crate::convert::decode::open_image;
use crate::convert::geometry::PyramidGeometry;
use crate::convert::jpeg::{flatten_to_rgb, validate_quality, write_jpeg};
use crate::io::configuration::{
    DEFAULT_TILE_OVERLAP, DEFAULT_TILE_QUALITY, DEFAULT_TILE_SIZE, DZI_NAMESPACE,
};
use crate::io::error::{ConvertError, Result, WithPath, invalid_parameter};
use crate::io::paths::tiles_dir_for;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::fmt;
use std::path::{Path, PathBuf};

/// Encoding of the pyramid tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TileFormat {
    /// Lossy JPEG tiles, alpha flattened onto white
    #[default]
    Jpg,
    /// Lossless PNG tiles, alpha preserved
    Png,
}

impl TileFormat {
    /// File extension, also written to the descriptor's `Format` attribute
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }

    /// Parse a descriptor `Format` attribute
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Settings shared by every pyramid of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepZoomSettings {
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Pixels shared between neighbouring tiles
    pub overlap: u32,
    /// Tile encoding
    pub format: TileFormat,
    /// JPEG tile quality (1-100), ignored for PNG
    pub quality: u8,
}

impl Default for DeepZoomSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            overlap: DEFAULT_TILE_OVERLAP,
            format: TileFormat::Jpg,
            quality: DEFAULT_TILE_QUALITY,
        }
    }
}

impl DeepZoomSettings {
    /// Check the settings before any file is touched
    ///
    /// # Errors
    ///
    /// Returns an error if the tile size is zero, the overlap is not smaller
    /// than the tile size, or the quality is outside 1-100
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(invalid_parameter(
                "tile_size",
                &self.tile_size,
                &"tile size must be positive",
            ));
        }
        if self.overlap >= self.tile_size {
            return Err(invalid_parameter(
                "overlap",
                &self.overlap,
                &"overlap must be smaller than the tile size",
            ));
        }
        validate_quality(self.quality)
    }
}

/// Contents of a `.dzi` descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepZoomDescriptor {
    /// Full-resolution width
    pub width: u32,
    /// Full-resolution height
    pub height: u32,
    /// Tile edge length
    pub tile_size: u32,
    /// Tile overlap
    pub overlap: u32,
    /// Tile encoding
    pub format: TileFormat,
}

impl DeepZoomDescriptor {
    /// Serialize to the descriptor XML
    pub fn to_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Image TileSize=\"{}\" Overlap=\"{}\" Format=\"{}\" xmlns=\"{DZI_NAMESPACE}\">\
             <Size Width=\"{}\" Height=\"{}\"/></Image>\n",
            self.tile_size, self.overlap, self.format, self.width, self.height
        )
    }

    /// Parse descriptor XML
    ///
    /// # Errors
    ///
    /// Returns an error if the `Image` or `Size` element or one of their
    /// attributes is missing or malformed
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_from(xml, Path::new("<memory>"))
    }

    /// Read and parse a descriptor file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a descriptor
    pub fn read(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).with_path(path, "read descriptor")?;
        Self::parse_from(&xml, path)
    }

    fn parse_from(xml: &str, path: &Path) -> Result<Self> {
        let malformed = |reason: String| ConvertError::InvalidDescriptor {
            path: path.to_path_buf(),
            reason,
        };

        let image = element(xml, "Image").ok_or_else(|| malformed("missing Image element".into()))?;
        let size = element(xml, "Size").ok_or_else(|| malformed("missing Size element".into()))?;

        let number = |tag: &str, name: &str| -> Result<u32> {
            let value = attribute(if tag == "Size" { size } else { image }, name)
                .ok_or_else(|| malformed(format!("missing {name} attribute")))?;
            value
                .parse()
                .map_err(|err| malformed(format!("{name} is not a number: '{value}' ({err})")))
        };

        let format_value =
            attribute(image, "Format").ok_or_else(|| malformed("missing Format attribute".into()))?;
        let format = TileFormat::from_extension(format_value)
            .ok_or_else(|| malformed(format!("unsupported tile format '{format_value}'")))?;

        Ok(Self {
            width: number("Size", "Width")?,
            height: number("Size", "Height")?,
            tile_size: number("Image", "TileSize")?,
            overlap: number("Image", "Overlap")?,
            format,
        })
    }
}

// Start tag of the first `<name ...>` element, without the brackets
fn element<'a>(xml: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}");
    let mut search_from = 0;
    while let Some(found) = xml.get(search_from..)?.find(&open) {
        let start = search_from + found + open.len();
        let rest = xml.get(start..)?;
        if rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
            let end = rest.find('>')?;
            return rest.get(..end);
        }
        search_from = start;
    }
    None
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    for quote in ['"', '\''] {
        let needle = format!("{name}={quote}");
        let mut search_from = 0;
        while let Some(found) = tag.get(search_from..)?.find(&needle) {
            let start = search_from + found;
            let preceded_by_space = tag
                .get(..start)
                .and_then(|before| before.chars().next_back())
                .is_none_or(char::is_whitespace);
            let value_start = start + needle.len();
            if preceded_by_space {
                let rest = tag.get(value_start..)?;
                let end = rest.find(quote)?;
                return rest.get(..end);
            }
            search_from = value_start;
        }
    }
    None
}

/// Writes DeepZoom pyramids
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepZoomCreator {
    settings: DeepZoomSettings,
}

impl DeepZoomCreator {
    /// Create a pyramid writer with the given settings
    pub const fn new(settings: DeepZoomSettings) -> Self {
        Self { settings }
    }

    /// Settings in use
    pub const fn settings(&self) -> DeepZoomSettings {
        self.settings
    }

    /// Convert `source` into `dzi_path` and its sibling `_files` directory
    ///
    /// `on_level(done, total)` is called after each written level.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding, directory creation, or any tile or
    /// descriptor write fails
    pub fn create(
        &self,
        source: &Path,
        dzi_path: &Path,
        on_level: impl FnMut(u32, u32),
    ) -> Result<DeepZoomDescriptor> {
        let image = open_image(source)?;
        self.create_from_image(image, dzi_path, on_level)
    }

    /// Write the pyramid for an already decoded image
    ///
    /// Levels are produced from full resolution downwards, each resampled
    /// with Lanczos3 from the level above. The descriptor is written last,
    /// so it only exists for a complete pyramid.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or any tile or descriptor
    /// write fails
    pub fn create_from_image(
        &self,
        image: DynamicImage,
        dzi_path: &Path,
        mut on_level: impl FnMut(u32, u32),
    ) -> Result<DeepZoomDescriptor> {
        let geometry = PyramidGeometry::new(
            image.width(),
            image.height(),
            self.settings.tile_size,
            self.settings.overlap,
        )?;

        // A descriptor only ever sits next to a complete pyramid
        if let Err(err) = std::fs::remove_file(dzi_path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            return Err(err).with_path(dzi_path, "remove old descriptor");
        }

        let tiles_dir = tiles_dir_for(dzi_path);
        if tiles_dir.exists() {
            std::fs::remove_dir_all(&tiles_dir).with_path(&tiles_dir, "remove old tiles")?;
        }
        std::fs::create_dir_all(&tiles_dir).with_path(&tiles_dir, "create directory")?;

        let mut level_image = match self.settings.format {
            TileFormat::Jpg => DynamicImage::ImageRgb8(flatten_to_rgb(&image)),
            TileFormat::Png => DynamicImage::ImageRgba8(image.to_rgba8()),
        };
        drop(image);

        let total = geometry.level_count();
        for level in (0..total).rev() {
            let (width, height) = geometry.level_dimensions(level).ok_or_else(|| {
                invalid_parameter("level", &level, &"level outside the pyramid")
            })?;
            if level_image.width() != width || level_image.height() != height {
                level_image = level_image.resize_exact(width, height, FilterType::Lanczos3);
            }
            self.write_level(&geometry, level, &level_image, &tiles_dir)?;
            on_level(total - level, total);
        }

        let descriptor = DeepZoomDescriptor {
            width: geometry.width(),
            height: geometry.height(),
            tile_size: geometry.tile_size(),
            overlap: geometry.overlap(),
            format: self.settings.format,
        };
        std::fs::write(dzi_path, descriptor.to_xml()).with_path(dzi_path, "write descriptor")?;

        Ok(descriptor)
    }

    fn write_level(
        &self,
        geometry: &PyramidGeometry,
        level: u32,
        level_image: &DynamicImage,
        tiles_dir: &Path,
    ) -> Result<()> {
        let level_dir = tiles_dir.join(level.to_string());
        std::fs::create_dir_all(&level_dir).with_path(&level_dir, "create directory")?;

        let (columns, rows) = geometry
            .tile_grid(level)
            .ok_or_else(|| invalid_parameter("level", &level, &"level outside the pyramid"))?;

        for column in 0..columns {
            for row in 0..rows {
                let Some(bounds) = geometry.tile_bounds(level, column, row) else {
                    continue;
                };
                let tile = level_image.crop_imm(bounds.x, bounds.y, bounds.width, bounds.height);
                let path = tile_path(&level_dir, column, row, self.settings.format);
                self.write_tile(&tile, &path)?;
            }
        }

        Ok(())
    }

    fn write_tile(&self, tile: &DynamicImage, path: &Path) -> Result<()> {
        match self.settings.format {
            TileFormat::Jpg => write_jpeg(&tile.to_rgb8(), path, self.settings.quality),
            TileFormat::Png => tile
                .save_with_format(path, ImageFormat::Png)
                .map_err(|source| ConvertError::ImageExport {
                    path: path.to_path_buf(),
                    source,
                }),
        }
    }
}

/// Path of tile (`column`, `row`) inside a level directory
pub fn tile_path(level_dir: &Path, column: u32, row: u32, format: TileFormat) -> PathBuf {
    level_dir.join(format!("{column}_{row}.{}", format.extension()))
}
