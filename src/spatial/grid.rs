//! Target brightness grid the mosaic approximates, one value per cell

use crate::algorithm::random::RandomSource;
use crate::io::configuration::{MAX_BRIGHTNESS, MAX_GRID_DIMENSION};
use crate::io::error::{Result, invalid_argument};
use ndarray::Array2;

/// Rectangular grid of brightness values on the 0-255 scale, row-major
#[derive(Clone, Debug, PartialEq)]
pub struct TargetGrid {
    values: Array2<f64>,
}

impl TargetGrid {
    /// Build a grid from nested rows
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if:
    /// - there are no rows, or any row is empty
    /// - rows differ in length
    /// - a value is not finite or lies outside 0-255
    /// - a dimension exceeds `MAX_GRID_DIMENSION`
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 {
            return Err(invalid_argument(
                "target_grid",
                &"[]",
                &"grid must have at least one row",
            ));
        }

        let mut flat = Vec::with_capacity(height * width);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.is_empty() {
                return Err(invalid_argument(
                    "target_grid",
                    &format!("row {row_index}"),
                    &"rows must not be empty",
                ));
            }
            if row.len() != width {
                return Err(invalid_argument(
                    "target_grid",
                    &format!("row {row_index} has {} values", row.len()),
                    &format!("grid must be rectangular with {width} values per row"),
                ));
            }
            flat.extend(row);
        }

        let values = Array2::from_shape_vec((height, width), flat).map_err(|e| {
            invalid_argument("target_grid", &format!("{width}x{height}"), &e)
        })?;
        Self::from_array(values)
    }

    /// Wrap an existing array after validating it
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the array is empty, too large, or holds a
    /// value that is not finite or outside 0-255
    pub fn from_array(values: Array2<f64>) -> Result<Self> {
        let (height, width) = values.dim();
        check_dimensions(height, width)?;
        if let Some(((row, col), value)) = values
            .indexed_iter()
            .find(|(_, value)| !value.is_finite() || !(0.0..=MAX_BRIGHTNESS).contains(*value))
        {
            return Err(invalid_argument(
                "target_grid",
                value,
                &format!("cell ({row}, {col}) must be a brightness between 0 and 255"),
            ));
        }
        Ok(Self { values })
    }

    /// Grid of `rows` x `cols` cells with independent uniform values in 0-255
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either dimension is zero or too large
    pub fn synthesize<R: RandomSource + ?Sized>(
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_dimensions(rows, cols)?;
        let values = Array2::from_shape_simple_fn((rows, cols), || rng.unit() * MAX_BRIGHTNESS);
        Self::from_array(values)
    }

    /// Grid of `rows` x `cols` cells all set to `value`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` under the same conditions as [`Self::from_array`]
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self> {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.values.len()
    }

    /// Target brightness at (`row`, `col`)
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get([row, col]).copied()
    }

    /// Underlying array in (row, column) order
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

fn check_dimensions(height: usize, width: usize) -> Result<()> {
    if height == 0 || width == 0 {
        return Err(invalid_argument(
            "target_grid",
            &format!("{width}x{height}"),
            &"grid must have at least one cell",
        ));
    }
    if height > MAX_GRID_DIMENSION || width > MAX_GRID_DIMENSION {
        return Err(invalid_argument(
            "target_grid",
            &format!("{width}x{height}"),
            &format!("dimensions are limited to {MAX_GRID_DIMENSION}"),
        ));
    }
    Ok(())
}
