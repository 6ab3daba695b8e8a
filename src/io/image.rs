//! Palette decoding and mosaic export

use crate::algorithm::pool::CandidateImage;
use crate::io::configuration::PALETTE_EXTENSIONS;
use crate::io::error::{MosaicError, Result};
use crate::io::progress::{ProgressObserver, ProgressStage, percent_complete};
use crate::spatial::raster::OutputRaster;
use image::DynamicImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Outcome of decoding a batch of palette files
#[derive(Debug, Default)]
pub struct PaletteLoad {
    /// Successfully fingerprinted candidates, in input order
    pub candidates: Vec<CandidateImage>,
    /// Files that could not be used, in input order
    pub failures: Vec<(PathBuf, MosaicError)>,
}

/// Decode and fingerprint a single palette file
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be read or decoded, or
/// `InvalidArgument` if the decoded image cannot be fingerprinted
pub fn decode_candidate(path: &Path, resolution: u32) -> Result<CandidateImage> {
    let decoded = image::open(path).map_err(|e| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    let label = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(CandidateImage::from_pixels(decoded.to_rgba8(), resolution)?.with_label(label))
}

/// Decode and fingerprint an in-memory encoded image
///
/// # Errors
///
/// Returns `ImageLoad` if the bytes are not a supported image format
pub fn decode_candidate_bytes(bytes: &[u8], resolution: u32) -> Result<CandidateImage> {
    let decoded = image::load_from_memory(bytes)?;
    CandidateImage::from_pixels(decoded.to_rgba8(), resolution)
}

/// Decode and fingerprint every path in parallel
///
/// A failing file is logged and recorded in `failures` without affecting the
/// others. `observer` receives the completed percentage after each file;
/// reports are serialised so the percentage never decreases.
pub fn load_palette(
    paths: &[PathBuf],
    resolution: u32,
    observer: Option<&dyn ProgressObserver>,
) -> PaletteLoad {
    let total = paths.len();
    let finished = Mutex::new(0_usize);

    let results: Vec<(PathBuf, Result<CandidateImage>)> = paths
        .par_iter()
        .map(|path| {
            let result = decode_candidate(path, resolution);
            if let Ok(mut done) = finished.lock() {
                *done += 1;
                if let Some(observer) = observer {
                    observer.report(ProgressStage::Fingerprinting, percent_complete(*done, total));
                }
            }
            (path.clone(), result)
        })
        .collect();

    let mut load = PaletteLoad::default();
    for (path, result) in results {
        match result {
            Ok(candidate) => load.candidates.push(candidate),
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping unusable palette image");
                load.failures.push((path, error));
            }
        }
    }

    info!(
        loaded = load.candidates.len(),
        skipped = load.failures.len(),
        "palette fingerprinted"
    );
    load
}

fn has_palette_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PALETTE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Expand files and directories into a sorted list of palette image paths
///
/// Files are taken as given; directories contribute their immediate entries
/// with a known image extension.
///
/// # Errors
///
/// Returns `FileSystem` if an input does not exist or a directory cannot be read
pub fn collect_palette_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
        } else if input.is_dir() {
            let read_error = |e: std::io::Error| MosaicError::FileSystem {
                path: input.clone(),
                operation: "read directory",
                source: e,
            };
            let mut found = Vec::new();
            for entry in std::fs::read_dir(input).map_err(read_error)? {
                let path = entry.map_err(read_error)?.path();
                if path.is_file() && has_palette_extension(&path) {
                    found.push(path);
                }
            }
            found.sort();
            paths.extend(found);
        } else {
            return Err(MosaicError::FileSystem {
                path: input.clone(),
                operation: "locate palette input",
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not a file or directory",
                ),
            });
        }
    }
    Ok(paths)
}

/// Save the raster; the format follows the file extension
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or saved to the specified path
pub fn export_raster(raster: &OutputRaster, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    // JPEG has no alpha channel
    let opaque = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    let encoded = if opaque {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(raster.image().clone()).to_rgb8())
    } else {
        DynamicImage::ImageRgba8(raster.image().clone())
    };

    encoded
        .save(path)
        .map_err(|e| MosaicError::ImageExport {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!(path = %path.display(), width = raster.width(), height = raster.height(), "mosaic written");
    Ok(())
}
