//! Output raster the assembler composites candidates into

use crate::io::configuration::{MAX_RASTER_BYTES, MAX_RASTER_DIMENSION};
use crate::io::error::{MosaicError, Result, invalid_argument};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Axis-aligned pixel rectangle covered by one grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Edge length in pixels
    pub size: u32,
}

/// Rectangle `[col * block_size, row * block_size, block_size, block_size]`
///
/// Returns `None` if the coordinates overflow `u32`.
pub fn cell_rect(row: usize, col: usize, block_size: u32) -> Option<CellRect> {
    let x = u32::try_from(col).ok()?.checked_mul(block_size)?;
    let y = u32::try_from(row).ok()?.checked_mul(block_size)?;
    Some(CellRect {
        x,
        y,
        size: block_size,
    })
}

/// Pixel buffer of `(cols * block_size) x (rows * block_size)`
#[derive(Clone, Debug)]
pub struct OutputRaster {
    image: RgbaImage,
    rows: usize,
    cols: usize,
    block_size: u32,
}

impl OutputRaster {
    /// Allocate a transparent raster for a `rows` x `cols` grid
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any dimension is zero, an edge exceeds
    /// `MAX_RASTER_DIMENSION`, or the RGBA buffer would exceed `MAX_RASTER_BYTES`
    pub fn new(rows: usize, cols: usize, block_size: u32) -> Result<Self> {
        let dimension = |cells: usize, name: &'static str| -> Result<u32> {
            u32::try_from(cells)
                .ok()
                .and_then(|count| count.checked_mul(block_size))
                .filter(|&pixels| pixels > 0 && pixels <= MAX_RASTER_DIMENSION)
                .ok_or_else(|| {
                    invalid_argument(
                        name,
                        &format!("{cells} cells of {block_size}px"),
                        &format!("raster edge must be between 1 and {MAX_RASTER_DIMENSION} pixels"),
                    )
                })
        };
        let width = dimension(cols, "raster_width")?;
        let height = dimension(rows, "raster_height")?;

        let bytes = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|pixels| pixels.checked_mul(4))
            .filter(|&bytes| bytes <= MAX_RASTER_BYTES);
        if bytes.is_none() {
            return Err(invalid_argument(
                "raster_size",
                &format!("{width}x{height}"),
                &format!("RGBA buffer must not exceed {MAX_RASTER_BYTES} bytes"),
            ));
        }

        Ok(Self {
            image: RgbaImage::new(width, height),
            rows,
            cols,
            block_size,
        })
    }

    /// Scale `pixels` to the cell at (`row`, `col`) and overwrite that cell
    ///
    /// The source is stretched to exactly fill the square cell.
    ///
    /// # Errors
    ///
    /// Returns `Compositing` if the cell lies outside the raster or the
    /// source image has no pixels
    pub fn draw_cell(
        &mut self,
        row: usize,
        col: usize,
        candidate: usize,
        pixels: &RgbaImage,
    ) -> Result<()> {
        let failure = |reason: &str| MosaicError::Compositing {
            row,
            col,
            candidate,
            reason: reason.to_string(),
        };

        if row >= self.rows || col >= self.cols {
            return Err(failure("cell lies outside the raster"));
        }
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(failure("candidate image has no pixels"));
        }
        let rect = cell_rect(row, col, self.block_size)
            .ok_or_else(|| failure("cell coordinates overflow"))?;

        let tile = if pixels.dimensions() == (rect.size, rect.size) {
            pixels.clone()
        } else {
            imageops::resize(pixels, rect.size, rect.size, FilterType::Triangle)
        };
        imageops::replace(
            &mut self.image,
            &tile,
            i64::from(rect.x),
            i64::from(rect.y),
        );
        Ok(())
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Grid rows covered
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns covered
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Pixels per cell edge
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Composited pixels
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the raster and return its pixels
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
