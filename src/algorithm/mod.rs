/// Row-major assembly of the output raster
pub mod assembler;
/// Candidate images, usage counters and the usage cap
pub mod pool;
/// Pluggable random source for tie-breaking
pub mod random;
/// Tiered candidate selection per cell
pub mod selection;
