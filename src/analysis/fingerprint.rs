//! Brightness fingerprint of a palette image
//!
//! An image of any size is resampled to a small fixed square and reduced to
//! the mean BT.601 luma over that square. The value lies on the 0-255 scale
//! and is the only property the selector compares.

use crate::io::configuration::MAX_BRIGHTNESS;
use crate::io::error::{Result, invalid_argument};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Red weight of the luma sum
pub const LUMA_RED: f64 = 0.299;
/// Green weight of the luma sum
pub const LUMA_GREEN: f64 = 0.587;
/// Blue weight of the luma sum
pub const LUMA_BLUE: f64 = 0.114;

/// Luma of a single pixel, ignoring alpha
pub fn luma(pixel: &Rgba<u8>) -> f64 {
    let [r, g, b, _] = pixel.0;
    LUMA_BLUE.mul_add(
        f64::from(b),
        LUMA_RED.mul_add(f64::from(r), LUMA_GREEN * f64::from(g)),
    )
}

/// Mean luma of `image` after resampling to `resolution` x `resolution`
///
/// Resampling uses a triangle (bilinear) filter so results are stable for a
/// given image and resolution.
///
/// # Errors
///
/// Returns `InvalidArgument` if the image has a zero dimension or
/// `resolution` is zero.
pub fn fingerprint(image: &RgbaImage, resolution: u32) -> Result<f64> {
    if image.width() == 0 || image.height() == 0 {
        return Err(invalid_argument(
            "image",
            &format!("{}x{}", image.width(), image.height()),
            &"image must be at least 1x1",
        ));
    }
    if resolution == 0 {
        return Err(invalid_argument(
            "fingerprint_resolution",
            &resolution,
            &"must be at least 1",
        ));
    }

    let resampled = imageops::resize(image, resolution, resolution, FilterType::Triangle);
    let total: f64 = resampled.pixels().map(luma).sum();
    let pixel_count = f64::from(resolution) * f64::from(resolution);

    // Weights sum to one, clamp only absorbs rounding at the extremes
    Ok((total / pixel_count).clamp(0.0, MAX_BRIGHTNESS))
}
