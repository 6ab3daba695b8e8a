//! Per-run usage statistics derived from a finished mosaic

use crate::algorithm::assembler::Mosaic;
use crate::algorithm::pool::CandidatePool;
use crate::algorithm::selection::SelectionTier;
use crate::io::error::{MosaicError, Result};
use crate::spatial::grid::TargetGrid;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// How often each selector tier was used
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    /// Unused candidate within tolerance
    pub fresh: usize,
    /// Reused candidate within tolerance and below the cap
    pub reused: usize,
    /// Closest fallback
    pub closest: usize,
}

impl TierCounts {
    /// Count for a single tier
    pub const fn get(&self, tier: SelectionTier) -> usize {
        match tier {
            SelectionTier::Fresh => self.fresh,
            SelectionTier::Reused => self.reused,
            SelectionTier::Closest => self.closest,
        }
    }

    /// Sum over all tiers
    pub const fn total(&self) -> usize {
        self.fresh + self.reused + self.closest
    }

    const fn add(&mut self, tier: SelectionTier) {
        match tier {
            SelectionTier::Fresh => self.fresh += 1,
            SelectionTier::Reused => self.reused += 1,
            SelectionTier::Closest => self.closest += 1,
        }
    }
}

/// Usage of one palette candidate
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateUsage {
    /// Position in the pool
    pub index: usize,
    /// Name given at ingestion
    pub label: String,
    /// Fingerprinted brightness
    pub brightness: f64,
    /// Times placed in the mosaic
    pub usage_count: usize,
    /// Whether the usage count ended above the cap
    pub over_cap: bool,
}

/// Summary of how a mosaic was assembled from its pool
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsageReport {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub cols: usize,
    /// Number of candidates in the pool
    pub pool_size: usize,
    /// Usage cap in force
    pub max_usage: usize,
    /// Selections per tier
    pub tiers: TierCounts,
    /// Candidates never placed
    pub unused_candidates: usize,
    /// Mean absolute brightness difference between placed candidate and target
    pub mean_absolute_error: f64,
    /// Per-candidate usage in pool order
    pub candidates: Vec<CandidateUsage>,
}

impl UsageReport {
    /// Build a report from the pool state right after `mosaic` was assembled
    pub fn from_run(grid: &TargetGrid, pool: &CandidatePool, mosaic: &Mosaic) -> Self {
        let max_usage = mosaic.max_usage();

        let mut tiers = TierCounts::default();
        for &tier in mosaic.tiers() {
            tiers.add(tier);
        }

        let total_error: f64 = mosaic
            .placements()
            .iter()
            .zip(grid.values())
            .filter_map(|(&index, &target)| pool.get(index).map(|c| c.distance_to(target)))
            .sum();
        let cells = grid.cell_count().max(1);

        let candidates: Vec<CandidateUsage> = pool
            .candidates()
            .iter()
            .enumerate()
            .map(|(index, candidate)| CandidateUsage {
                index,
                label: candidate.label().to_string(),
                brightness: candidate.brightness(),
                usage_count: candidate.usage_count(),
                over_cap: candidate.usage_count() > max_usage,
            })
            .collect();

        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            pool_size: pool.len(),
            max_usage,
            tiers,
            unused_candidates: candidates.iter().filter(|c| c.usage_count == 0).count(),
            mean_absolute_error: total_error / cells as f64,
            candidates,
        }
    }

    /// Total placements across all candidates
    pub fn total_selections(&self) -> usize {
        self.candidates.iter().map(|c| c.usage_count).sum()
    }

    /// Candidates whose usage ended above the cap
    pub fn over_cap(&self) -> impl Iterator<Item = &CandidateUsage> {
        self.candidates.iter().filter(|c| c.over_cap)
    }

    /// Serialise the report as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MosaicError::FileSystem {
            path: "<report>".into(),
            operation: "serialise report",
            source: e.into(),
        })
    }

    /// Write the report as JSON to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created or written
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = File::create(path).map_err(|e| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "create report",
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "write report",
            source: e.into(),
        })?;
        writer.flush().map_err(|e| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "flush report",
            source: e,
        })
    }
}
