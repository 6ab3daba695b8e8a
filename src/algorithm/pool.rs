//! Candidate images and the pool they are selected from

use crate::analysis::fingerprint::fingerprint;
use crate::io::configuration::MAX_BRIGHTNESS;
use crate::io::error::{Result, invalid_argument};
use image::RgbaImage;
use std::sync::Arc;

/// A palette image with its cached brightness and per-run usage counter
#[derive(Clone, Debug)]
pub struct CandidateImage {
    pixels: Arc<RgbaImage>,
    brightness: f64,
    usage_count: usize,
    label: String,
}

impl CandidateImage {
    /// Wrap decoded pixels with an already known brightness
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `brightness` is not finite or lies
    /// outside 0-255
    pub fn new(pixels: RgbaImage, brightness: f64) -> Result<Self> {
        if !brightness.is_finite() || !(0.0..=MAX_BRIGHTNESS).contains(&brightness) {
            return Err(invalid_argument(
                "brightness",
                &brightness,
                &"must be a finite value between 0 and 255",
            ));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
            brightness,
            usage_count: 0,
            label: String::new(),
        })
    }

    /// Fingerprint decoded pixels and wrap them as a candidate
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be fingerprinted (zero-sized
    /// image or zero resolution)
    pub fn from_pixels(pixels: RgbaImage, resolution: u32) -> Result<Self> {
        let brightness = fingerprint(&pixels, resolution)?;
        Self::new(pixels, brightness)
    }

    /// Attach a human readable name, typically the source file name
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Mean luma computed at ingestion
    pub const fn brightness(&self) -> f64 {
        self.brightness
    }

    /// Times this candidate has been chosen in the current run
    pub const fn usage_count(&self) -> usize {
        self.usage_count
    }

    /// Decoded pixel data
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Name given at ingestion, empty if none
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Absolute brightness difference to `target`
    pub fn distance_to(&self, target: f64) -> f64 {
        (self.brightness - target).abs()
    }

    pub(crate) const fn record_use(&mut self) {
        self.usage_count += 1;
    }

    const fn reset_usage(&mut self) {
        self.usage_count = 0;
    }
}

/// Usage cap for a run: `max(1, floor(cells / pool_size) * 2)`
pub fn usage_cap(cell_count: usize, pool_size: usize) -> usize {
    cell_count
        .checked_div(pool_size)
        .unwrap_or(0)
        .saturating_mul(2)
        .max(1)
}

/// Non-empty working set of candidates with a shared usage cap
///
/// A pool belongs to one assembly run at a time; clone it to run several
/// generations concurrently. Clones share pixel data but not usage counts.
#[derive(Clone, Debug)]
pub struct CandidatePool {
    candidates: Vec<CandidateImage>,
    max_usage: usize,
}

impl CandidatePool {
    /// Build a pool from fingerprinted candidates
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `candidates` is empty
    pub fn new(candidates: Vec<CandidateImage>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(invalid_argument(
                "pool",
                &0,
                &"candidate pool must contain at least one image",
            ));
        }
        Ok(Self {
            candidates,
            max_usage: 1,
        })
    }

    /// Number of candidates
    pub const fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false; an empty pool cannot be constructed
    pub const fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Current usage cap
    pub const fn max_usage(&self) -> usize {
        self.max_usage
    }

    /// Override the usage cap, never below 1
    pub fn set_max_usage(&mut self, max_usage: usize) {
        self.max_usage = max_usage.max(1);
    }

    /// All candidates in pool order
    pub fn candidates(&self) -> &[CandidateImage] {
        &self.candidates
    }

    /// Candidate at `index` in pool order
    pub fn get(&self, index: usize) -> Option<&CandidateImage> {
        self.candidates.get(index)
    }

    /// Zero every usage counter and derive the cap for `cell_count` cells
    ///
    /// Returns the new cap.
    pub fn reset_for_run(&mut self, cell_count: usize) -> usize {
        for candidate in &mut self.candidates {
            candidate.reset_usage();
        }
        self.max_usage = usage_cap(cell_count, self.candidates.len());
        self.max_usage
    }

    /// Sum of all usage counters
    pub fn total_usage(&self) -> usize {
        self.candidates.iter().map(CandidateImage::usage_count).sum()
    }

    pub(crate) fn record_use(&mut self, index: usize) {
        if let Some(candidate) = self.candidates.get_mut(index) {
            candidate.record_use();
        }
    }
}
