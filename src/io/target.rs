//! Target grid provider: JSON file or synthesized random grid
//!
//! A target file is a JSON array of rows, each an array of brightness values
//! between 0 and 255, e.g. `[[12.5, 200], [64, 0]]`.

use crate::algorithm::random::RandomSource;
use crate::io::configuration::MosaicConfig;
use crate::io::error::{MosaicError, Result};
use crate::spatial::grid::TargetGrid;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn parse_at(text: &str, path: PathBuf) -> Result<TargetGrid> {
    let rows: Vec<Vec<f64>> =
        serde_json::from_str(text).map_err(|e| MosaicError::TargetParse { path, source: e })?;
    TargetGrid::from_rows(rows)
}

/// Parse a target grid from JSON text
///
/// # Errors
///
/// Returns `TargetParse` for malformed JSON and `InvalidArgument` for a
/// grid that is empty, ragged or out of range
pub fn parse_target_grid(text: &str) -> Result<TargetGrid> {
    parse_at(text, PathBuf::from("<inline>"))
}

/// Read and validate a target grid file
///
/// # Errors
///
/// Returns `FileSystem` if the file cannot be read, otherwise the errors of
/// [`parse_target_grid`]
pub fn load_target_grid(path: &Path) -> Result<TargetGrid> {
    let text = std::fs::read_to_string(path).map_err(|e| MosaicError::FileSystem {
        path: path.to_path_buf(),
        operation: "read target grid",
        source: e,
    })?;
    let grid = parse_at(&text, path.to_path_buf())?;
    info!(
        path = %path.display(),
        rows = grid.rows(),
        cols = grid.cols(),
        "target grid loaded"
    );
    Ok(grid)
}

/// Load the grid at `path`, or synthesize the default-sized random grid
///
/// A supplied file that fails to load is an error; synthesis is used only
/// when no path is given.
///
/// # Errors
///
/// Propagates errors from [`load_target_grid`] or grid synthesis
pub fn resolve_target_grid<R: RandomSource + ?Sized>(
    path: Option<&Path>,
    config: &MosaicConfig,
    rng: &mut R,
) -> Result<TargetGrid> {
    match path {
        Some(file) => load_target_grid(file),
        None => {
            debug!(
                rows = config.default_grid_rows,
                cols = config.default_grid_columns,
                "no target grid supplied, synthesizing"
            );
            TargetGrid::synthesize(config.default_grid_rows, config.default_grid_columns, rng)
        }
    }
}
