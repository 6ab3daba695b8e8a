//! Mosaic constants and runtime configuration defaults

use crate::io::error::{Result, invalid_argument};

/// Edge length in output pixels of one grid cell
pub const DEFAULT_BLOCK_SIZE: u32 = 8;

/// Maximum brightness difference accepted as a match
pub const DEFAULT_TOLERANCE: f64 = 15.0;

/// Edge length of the square each palette image is resampled to before averaging luma
pub const FINGERPRINT_RESOLUTION: u32 = 32;

// Used only when no target grid is supplied
/// Rows of a synthesized target grid
pub const DEFAULT_GRID_ROWS: usize = 60;
/// Columns of a synthesized target grid
pub const DEFAULT_GRID_COLUMNS: usize = 80;

/// Upper bound of the luma scale
pub const MAX_BRIGHTNESS: f64 = 255.0;

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

// Output settings
/// File name used when no output path is given
pub const DEFAULT_OUTPUT_FILE: &str = "mosaic.png";

/// File extensions picked up when a palette directory is scanned
pub const PALETTE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Tunable parameters of one mosaic generation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MosaicConfig {
    /// Output pixels per cell edge
    pub block_size: u32,
    /// Maximum brightness difference considered a match
    pub tolerance: f64,
    /// Resampling edge length used by fingerprinting
    pub fingerprint_resolution: u32,
    /// Rows of a synthesized target grid
    pub default_grid_rows: usize,
    /// Columns of a synthesized target grid
    pub default_grid_columns: usize,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            fingerprint_resolution: FINGERPRINT_RESOLUTION,
            default_grid_rows: DEFAULT_GRID_ROWS,
            default_grid_columns: DEFAULT_GRID_COLUMNS,
        }
    }
}

impl MosaicConfig {
    /// Check every field against its domain
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if:
    /// - `block_size` or `fingerprint_resolution` is zero
    /// - `tolerance` is negative, NaN or infinite
    /// - either synthesized grid dimension is zero
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(invalid_argument(
                "block_size",
                &self.block_size,
                &"must be at least 1",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(invalid_argument(
                "tolerance",
                &self.tolerance,
                &"must be a finite, non-negative number",
            ));
        }
        if self.fingerprint_resolution == 0 {
            return Err(invalid_argument(
                "fingerprint_resolution",
                &self.fingerprint_resolution,
                &"must be at least 1",
            ));
        }
        if self.default_grid_rows == 0 || self.default_grid_columns == 0 {
            return Err(invalid_argument(
                "default_grid_dimensions",
                &format!("{}x{}", self.default_grid_columns, self.default_grid_rows),
                &"both dimensions must be at least 1",
            ));
        }
        Ok(())
    }
}

// Safety limits to prevent excessive memory allocation
/// Maximum allowed target grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;
/// Maximum allowed raster edge in pixels
pub const MAX_RASTER_DIMENSION: u32 = 65_535;
/// Maximum RGBA buffer size of the output raster in bytes
pub const MAX_RASTER_BYTES: u64 = 1 << 30;
