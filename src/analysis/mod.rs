//! Image measurements and run statistics

/// Luma fingerprint of palette images
pub mod fingerprint;
/// Usage and tier statistics of a finished mosaic
pub mod report;
