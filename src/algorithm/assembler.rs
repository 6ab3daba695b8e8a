//! Row-major mosaic assembly driving the selector and compositing each cell

use crate::algorithm::pool::CandidatePool;
use crate::algorithm::random::RandomSource;
use crate::algorithm::selection::{SelectionTier, select_candidate};
use crate::io::configuration::MosaicConfig;
use crate::io::error::{MosaicError, Result};
use crate::io::progress::{ProgressObserver, ProgressStage, percent_complete};
use crate::spatial::grid::TargetGrid;
use crate::spatial::raster::OutputRaster;
use ndarray::Array2;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Completed mosaic together with the per-cell decisions that produced it
#[derive(Clone, Debug)]
pub struct Mosaic {
    raster: OutputRaster,
    placements: Array2<usize>,
    tiers: Array2<SelectionTier>,
    max_usage: usize,
}

impl Mosaic {
    /// Composited output
    pub const fn raster(&self) -> &OutputRaster {
        &self.raster
    }

    /// Consume the mosaic and keep only the raster
    pub fn into_raster(self) -> OutputRaster {
        self.raster
    }

    /// Pool index chosen for each cell
    pub const fn placements(&self) -> &Array2<usize> {
        &self.placements
    }

    /// Selector tier that chose each cell
    pub const fn tiers(&self) -> &Array2<SelectionTier> {
        &self.tiers
    }

    /// Usage cap in force during the run
    pub const fn max_usage(&self) -> usize {
        self.max_usage
    }
}

/// Walks a target grid and fills an output raster from a candidate pool
///
/// The assembler is synchronous; the only points where it yields control are
/// row boundaries, where it reports progress and checks the cancellation flag.
pub struct MosaicAssembler<'a> {
    config: MosaicConfig,
    observer: Option<&'a dyn ProgressObserver>,
    cancellation: Option<Arc<AtomicBool>>,
}

impl<'a> MosaicAssembler<'a> {
    /// Create an assembler with no observer and no cancellation flag
    pub const fn new(config: MosaicConfig) -> Self {
        Self {
            config,
            observer: None,
            cancellation: None,
        }
    }

    /// Report row progress to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stop before the next row once `flag` is set
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Configuration in use
    pub const fn config(&self) -> &MosaicConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Select and composite one candidate per cell of `grid`
    ///
    /// Resets every usage counter in `pool` and recomputes its cap before the
    /// first cell. Either every cell is drawn or no raster is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the configuration is invalid or the raster would be too large
    /// - a chosen candidate cannot be drawn (`Compositing`)
    /// - the cancellation flag is observed at a row boundary (`Cancelled`)
    pub fn assemble<R: RandomSource + ?Sized>(
        &self,
        grid: &TargetGrid,
        pool: &mut CandidatePool,
        rng: &mut R,
    ) -> Result<Mosaic> {
        self.config.validate()?;
        let (rows, cols) = (grid.rows(), grid.cols());
        let mut raster = OutputRaster::new(rows, cols, self.config.block_size)?;

        let max_usage = pool.reset_for_run(grid.cell_count());
        debug!(
            rows,
            cols,
            pool_size = pool.len(),
            max_usage,
            "starting mosaic assembly"
        );

        let mut placements = Array2::zeros((rows, cols));
        let mut tiers = Array2::from_elem((rows, cols), SelectionTier::default());

        for (row, targets) in grid.values().outer_iter().enumerate() {
            if self.is_cancelled() {
                return Err(MosaicError::Cancelled {
                    completed_rows: row,
                });
            }

            for (col, &target) in targets.iter().enumerate() {
                let selection = select_candidate(target, pool, self.config.tolerance, rng)?;
                let candidate = pool.get(selection.index).ok_or_else(|| {
                    MosaicError::Compositing {
                        row,
                        col,
                        candidate: selection.index,
                        reason: "candidate is missing from the pool".to_string(),
                    }
                })?;
                raster.draw_cell(row, col, selection.index, candidate.pixels())?;

                if let Some(slot) = placements.get_mut([row, col]) {
                    *slot = selection.index;
                }
                if let Some(slot) = tiers.get_mut([row, col]) {
                    *slot = selection.tier;
                }
            }

            let percent = percent_complete(row + 1, rows);
            debug!(row, percent, "row assembled");
            if let Some(observer) = self.observer {
                observer.report(ProgressStage::Assembly, percent);
            }
        }

        Ok(Mosaic {
            raster,
            placements,
            tiers,
            max_usage,
        })
    }
}

/// Assemble with `config` and no observer or cancellation
///
/// # Errors
///
/// Propagates any error from [`MosaicAssembler::assemble`]
pub fn assemble<R: RandomSource + ?Sized>(
    grid: &TargetGrid,
    pool: &mut CandidatePool,
    config: MosaicConfig,
    rng: &mut R,
) -> Result<Mosaic> {
    MosaicAssembler::new(config).assemble(grid, pool, rng)
}
