//! Photo mosaic assembly matched on luminance
//!
//! Palette images are reduced to a single brightness fingerprint, then each
//! cell of a target brightness grid is filled with a palette image chosen by
//! a tolerance-and-fairness policy and composited into an output raster.

#![forbid(unsafe_code)]

/// Candidate pool, selection policy and mosaic assembly
pub mod algorithm;
/// Brightness fingerprints and run statistics
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Target grid and output raster geometry
pub mod spatial;

pub use algorithm::assembler::{Mosaic, MosaicAssembler, assemble};
pub use algorithm::pool::{CandidateImage, CandidatePool};
pub use algorithm::random::{RandomSelector, RandomSource};
pub use algorithm::selection::{Selection, SelectionTier, select_candidate};
pub use analysis::fingerprint::fingerprint;
pub use io::configuration::MosaicConfig;
pub use io::error::{MosaicError, Result};
pub use spatial::grid::TargetGrid;
pub use spatial::raster::OutputRaster;
