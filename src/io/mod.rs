/// Command-line front end
pub mod cli;
/// Constants and runtime configuration
pub mod configuration;
/// Error types
pub mod error;
/// Palette decoding and raster export
pub mod image;
/// Progress observer and terminal progress bars
pub mod progress;
/// Target grid provider
pub mod target;
