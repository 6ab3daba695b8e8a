//! Tests for row-major mosaic assembly, progress and cancellation

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use lumamosaic::algorithm::assembler::{MosaicAssembler, assemble};
    use lumamosaic::algorithm::pool::{CandidateImage, CandidatePool};
    use lumamosaic::algorithm::random::RandomSelector;
    use lumamosaic::algorithm::selection::SelectionTier;
    use lumamosaic::io::configuration::MosaicConfig;
    use lumamosaic::io::error::MosaicError;
    use lumamosaic::io::progress::{ProgressObserver, ProgressStage};
    use lumamosaic::spatial::grid::TargetGrid;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingObserver {
        reports: Mutex<Vec<(ProgressStage, u8)>>,
        cancel_after_first_row: Option<Arc<AtomicBool>>,
    }

    impl ProgressObserver for RecordingObserver {
        fn report(&self, stage: ProgressStage, percent: u8) {
            if let Ok(mut reports) = self.reports.lock() {
                reports.push((stage, percent));
            }
            if let Some(flag) = &self.cancel_after_first_row {
                flag.store(true, Ordering::Relaxed);
            }
        }
    }

    fn gray_pool(levels: &[u8]) -> CandidatePool {
        let candidates = levels
            .iter()
            .map(|&level| {
                CandidateImage::from_pixels(
                    RgbaImage::from_pixel(6, 3, Rgba([level, level, level, 255])),
                    32,
                )
                .unwrap()
            })
            .collect();
        CandidatePool::new(candidates).unwrap()
    }

    fn small_config() -> MosaicConfig {
        MosaicConfig {
            block_size: 4,
            ..MosaicConfig::default()
        }
    }

    // Tests every cell is filled exactly once and usage totals match
    // Verified by skipping the last column of each row
    #[test]
    fn test_every_cell_selected_once() {
        let mut pool = gray_pool(&[0, 60, 120, 180, 240]);
        let mut rng = RandomSelector::new(11);
        let grid = TargetGrid::synthesize(6, 7, &mut rng).unwrap();

        let mosaic = assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();

        assert_eq!(mosaic.placements().dim(), (6, 7));
        assert_eq!(pool.total_usage(), 42);
        for (index, candidate) in pool.candidates().iter().enumerate() {
            let placed = mosaic.placements().iter().filter(|&&p| p == index).count();
            assert_eq!(placed, candidate.usage_count());
        }
        assert_eq!(mosaic.raster().width(), 28);
        assert_eq!(mosaic.raster().height(), 24);
    }

    // Tests only closest-fallback selections push a candidate above the cap
    // Verified by letting tier two ignore the cap
    #[test]
    fn test_cap_exceeded_only_by_closest() {
        for seed in 0..20 {
            let mut pool = gray_pool(&[20, 30, 128, 220]);
            let mut rng = RandomSelector::new(seed);
            let grid = TargetGrid::synthesize(10, 10, &mut rng).unwrap();

            let mosaic = assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();
            let max_usage = mosaic.max_usage();
            assert_eq!(max_usage, 50);

            let mut counts = vec![0usize; pool.len()];
            for (&index, &tier) in mosaic.placements().iter().zip(mosaic.tiers()) {
                if let Some(count) = counts.get_mut(index) {
                    *count += 1;
                    if tier != SelectionTier::Closest {
                        assert!(*count <= max_usage, "tier {tier:?} exceeded the cap");
                    }
                }
            }
        }
    }

    // Tests reuse within tolerance stops exactly at the cap
    // Verified by comparing usage with a non-strict bound in tier two
    #[test]
    fn test_reuse_up_to_cap() {
        let mut pool = gray_pool(&[0, 255]);
        let mut rng = RandomSelector::new(5);
        let grid = TargetGrid::filled(2, 3, 10.0).unwrap();

        let mosaic = assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();

        assert_eq!(mosaic.max_usage(), 6);
        assert_eq!(pool.get(0).map(CandidateImage::usage_count), Some(6));
        assert!(mosaic.tiers().iter().all(|&t| t != SelectionTier::Closest));
    }

    // Tests a cap overrun is reachable through the closest fallback
    // Verified by enforcing the cap in tier three
    #[test]
    fn test_closest_overrun_in_full_run() {
        let mut pool = gray_pool(&[0, 255, 250, 245]);
        let mut rng = RandomSelector::new(5);
        let grid = TargetGrid::filled(1, 8, 5.0).unwrap();

        let mosaic = assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();

        assert_eq!(mosaic.max_usage(), 4);
        assert_eq!(pool.get(0).map(CandidateImage::usage_count), Some(8));
        assert_eq!(
            mosaic
                .tiers()
                .iter()
                .filter(|&&t| t == SelectionTier::Closest)
                .count(),
            4
        );
    }

    // Tests a grid smaller than the pool still gets a cap of one
    // Verified by removing the lower bound on the cap
    #[test]
    fn test_minimum_cap() {
        let mut pool = gray_pool(&[0, 255]);
        let mut rng = RandomSelector::new(5);
        let grid = TargetGrid::filled(1, 1, 10.0).unwrap();

        let mosaic = assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();
        assert_eq!(mosaic.max_usage(), 1);
    }

    // Tests usage counters are reset before the first cell
    // Verified by removing the reset call
    #[test]
    fn test_usage_reset_between_runs() {
        let mut pool = gray_pool(&[100, 110]);
        let mut rng = RandomSelector::new(1);
        let grid = TargetGrid::filled(2, 2, 105.0).unwrap();

        assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();
        assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();

        assert_eq!(pool.total_usage(), 4);
    }

    // Tests the raster receives the original candidate pixels
    // Verified by tinting the tile before drawing
    #[test]
    fn test_cells_hold_candidate_pixels() {
        let red = CandidateImage::from_pixels(
            RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255])),
            32,
        )
        .unwrap();
        let target = red.brightness();
        let mut pool = CandidatePool::new(vec![red]).unwrap();
        let mut rng = RandomSelector::new(0);
        let grid = TargetGrid::filled(2, 2, target).unwrap();

        let mosaic = assemble(&grid, &mut pool, small_config(), &mut rng).unwrap();

        assert!(
            mosaic
                .raster()
                .image()
                .pixels()
                .all(|p| *p == Rgba([255, 0, 0, 255]))
        );
    }

    // Tests one progress report per row with rounded percentages
    // Verified by reporting before the row is processed
    #[test]
    fn test_progress_reported_per_row() {
        let observer = RecordingObserver::default();
        let mut pool = gray_pool(&[50, 150]);
        let mut rng = RandomSelector::new(2);
        let grid = TargetGrid::filled(3, 2, 100.0).unwrap();

        MosaicAssembler::new(small_config())
            .with_observer(&observer)
            .assemble(&grid, &mut pool, &mut rng)
            .unwrap();

        let reports = observer.reports.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(
            reports,
            vec![
                (ProgressStage::Assembly, 33),
                (ProgressStage::Assembly, 67),
                (ProgressStage::Assembly, 100),
            ]
        );
    }

    // Tests a preset cancellation flag stops before any work
    // Verified by checking the flag after the first row
    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut pool = gray_pool(&[50]);
        let mut rng = RandomSelector::new(0);
        let grid = TargetGrid::filled(2, 2, 50.0).unwrap();

        let result = MosaicAssembler::new(small_config())
            .with_cancellation(flag)
            .assemble(&grid, &mut pool, &mut rng);

        assert!(matches!(
            result,
            Err(MosaicError::Cancelled { completed_rows: 0 })
        ));
        assert_eq!(pool.total_usage(), 0);
    }

    // Tests cancellation is honoured at the next row boundary
    // Verified by ignoring the flag after assembly starts
    #[test]
    fn test_cancelled_between_rows() {
        let flag = Arc::new(AtomicBool::new(false));
        let observer = RecordingObserver {
            cancel_after_first_row: Some(Arc::clone(&flag)),
            ..RecordingObserver::default()
        };
        let mut pool = gray_pool(&[50]);
        let mut rng = RandomSelector::new(0);
        let grid = TargetGrid::filled(4, 3, 50.0).unwrap();

        let result = MosaicAssembler::new(small_config())
            .with_observer(&observer)
            .with_cancellation(flag)
            .assemble(&grid, &mut pool, &mut rng);

        assert!(matches!(
            result,
            Err(MosaicError::Cancelled { completed_rows: 1 })
        ));
        assert_eq!(pool.total_usage(), 3);
    }

    // Tests unusable pixel data fails the whole run
    // Verified by skipping cells that fail to draw
    #[test]
    fn test_compositing_failure_is_fatal() {
        let broken = CandidateImage::new(RgbaImage::new(0, 0), 100.0).unwrap();
        let mut pool = CandidatePool::new(vec![broken]).unwrap();
        let mut rng = RandomSelector::new(0);
        let grid = TargetGrid::filled(2, 2, 100.0).unwrap();

        let result = assemble(&grid, &mut pool, small_config(), &mut rng);

        assert!(matches!(
            result,
            Err(MosaicError::Compositing {
                row: 0,
                col: 0,
                candidate: 0,
                ..
            })
        ));
    }

    // Tests invalid configuration is rejected before any selection
    // Verified by validating after the reset
    #[test]
    fn test_invalid_config_rejected() {
        let mut pool = gray_pool(&[50]);
        let mut rng = RandomSelector::new(0);
        let grid = TargetGrid::filled(1, 1, 50.0).unwrap();
        let config = MosaicConfig {
            block_size: 0,
            ..MosaicConfig::default()
        };

        let result = assemble(&grid, &mut pool, config, &mut rng);
        assert!(result.is_err_and(|e| e.is_invalid_argument()));
        assert_eq!(pool.total_usage(), 0);
    }

    // Tests the assembler keeps the configuration it was built with
    // Verified by substituting the default configuration
    #[test]
    fn test_config_accessor() {
        let assembler = MosaicAssembler::new(small_config());
        assert_eq!(assembler.config().block_size, 4);
    }
}
