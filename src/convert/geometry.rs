//! DeepZoom pyramid arithmetic: levels, level sizes and tile rectangles

use crate::io::error::{Result, invalid_parameter};

/// Pixel rectangle of one tile inside its level image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width including overlap
    pub width: u32,
    /// Height including overlap
    pub height: u32,
}

/// Layout of a DeepZoom pyramid for one source image
///
/// Level 0 is a single pixel wide or tall; the last level is the source at
/// full resolution. Each level halves the one above it, rounding up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidGeometry {
    width: u32,
    height: u32,
    tile_size: u32,
    overlap: u32,
    levels: u32,
}

impl PyramidGeometry {
    /// Build the layout for a `width` x `height` image
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension or the tile size is zero
    pub fn new(width: u32, height: u32, tile_size: u32, overlap: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(invalid_parameter(
                "dimensions",
                &format!("{width}x{height}"),
                &"image must have at least one pixel",
            ));
        }
        if tile_size == 0 {
            return Err(invalid_parameter(
                "tile_size",
                &tile_size,
                &"tile size must be positive",
            ));
        }

        Ok(Self {
            width,
            height,
            tile_size,
            overlap,
            levels: ceil_log2(width.max(height)) + 1,
        })
    }

    /// Source width
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Source height
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile edge length
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Tile overlap
    pub const fn overlap(&self) -> u32 {
        self.overlap
    }

    /// Number of levels in the pyramid
    pub const fn level_count(&self) -> u32 {
        self.levels
    }

    /// Index of the full-resolution level
    pub const fn max_level(&self) -> u32 {
        self.levels - 1
    }

    /// Dimensions of `level`, or `None` past the top of the pyramid
    pub fn level_dimensions(&self, level: u32) -> Option<(u32, u32)> {
        if level > self.max_level() {
            return None;
        }
        let shift = self.max_level() - level;
        Some((
            ceil_shift(self.width, shift),
            ceil_shift(self.height, shift),
        ))
    }

    /// Number of tile columns and rows at `level`
    pub fn tile_grid(&self, level: u32) -> Option<(u32, u32)> {
        let (w, h) = self.level_dimensions(level)?;
        Some((w.div_ceil(self.tile_size), h.div_ceil(self.tile_size)))
    }

    /// Number of tiles in the whole pyramid
    pub fn tile_count(&self) -> u64 {
        (0..self.levels)
            .filter_map(|level| self.tile_grid(level))
            .map(|(cols, rows)| u64::from(cols) * u64::from(rows))
            .sum()
    }

    /// Rectangle covered by tile (`column`, `row`) at `level`
    ///
    /// Interior edges extend by the overlap on both sides, the first row and
    /// column only on the far side, and every tile is clipped to the level.
    pub fn tile_bounds(&self, level: u32, column: u32, row: u32) -> Option<TileBounds> {
        let (level_width, level_height) = self.level_dimensions(level)?;
        let (cols, rows) = self.tile_grid(level)?;
        if column >= cols || row >= rows {
            return None;
        }

        let (x, width) = self.span(column, level_width);
        let (y, height) = self.span(row, level_height);
        Some(TileBounds {
            x,
            y,
            width,
            height,
        })
    }

    fn span(&self, index: u32, extent: u32) -> (u32, u32) {
        let (offset, sides) = if index == 0 {
            (0, 1)
        } else {
            (self.overlap, 2)
        };
        let start = (index * self.tile_size).saturating_sub(offset);
        let length = self
            .tile_size
            .saturating_add(self.overlap.saturating_mul(sides))
            .min(extent - start);
        (start, length)
    }
}

// ceil(log2(n)) for n >= 1
const fn ceil_log2(n: u32) -> u32 {
    if n <= 1 {
        0
    } else {
        u32::BITS - (n - 1).leading_zeros()
    }
}

// ceil(n / 2^shift)
const fn ceil_shift(n: u32, shift: u32) -> u32 {
    if shift >= u32::BITS {
        return 1;
    }
    let divisor = 1_u64 << shift;
    (n as u64).div_ceil(divisor) as u32
}
