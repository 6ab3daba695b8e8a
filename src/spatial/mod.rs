//! Grid geometry shared by the target and the output

/// Target brightness grid
pub mod grid;
/// Output pixel buffer and cell rectangles
pub mod raster;
