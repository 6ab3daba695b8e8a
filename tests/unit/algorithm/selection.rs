//! Tests for the three-tier candidate selection policy

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use lumamosaic::algorithm::pool::{CandidateImage, CandidatePool};
    use lumamosaic::algorithm::random::{RandomSelector, RandomSource};
    use lumamosaic::algorithm::selection::{
        SelectionTier, closest_candidate, fresh_candidates, reusable_candidates,
        select_candidate,
    };

    /// Replays a fixed list of indices, wrapping each into range
    struct ScriptedSource {
        picks: Vec<usize>,
        cursor: usize,
    }

    impl ScriptedSource {
        fn new(picks: &[usize]) -> Self {
            Self {
                picks: picks.to_vec(),
                cursor: 0,
            }
        }
    }

    impl RandomSource for ScriptedSource {
        fn choose_index(&mut self, len: usize) -> usize {
            let pick = self.picks.get(self.cursor).copied().unwrap_or(0);
            self.cursor += 1;
            pick % len.max(1)
        }

        fn unit(&mut self) -> f64 {
            0.5
        }
    }

    fn pool_of(brightness: &[f64]) -> CandidatePool {
        let candidates = brightness
            .iter()
            .map(|&b| {
                let level = b.round().clamp(0.0, 255.0) as u8;
                CandidateImage::new(
                    RgbaImage::from_pixel(2, 2, Rgba([level, level, level, 255])),
                    b,
                )
                .unwrap()
            })
            .collect();
        CandidatePool::new(candidates).unwrap()
    }

    fn usage(pool: &CandidatePool) -> Vec<usize> {
        pool.candidates().iter().map(|c| c.usage_count()).collect()
    }

    // Tests the only candidate within tolerance is chosen fresh
    // Verified by widening the tolerance filter
    #[test]
    fn test_single_qualifier_chosen_fresh() {
        let mut pool = pool_of(&[10.0, 250.0]);
        let mut rng = ScriptedSource::new(&[1]);

        let selection = select_candidate(12.0, &mut pool, 15.0, &mut rng).unwrap();

        assert_eq!(selection.index, 0);
        assert_eq!(selection.tier, SelectionTier::Fresh);
        assert_eq!(usage(&pool), vec![1, 0]);
    }

    // Tests tolerance is inclusive at the boundary
    // Verified by using a strict comparison
    #[test]
    fn test_tolerance_boundary_inclusive() {
        let mut pool = pool_of(&[100.0]);
        let mut rng = ScriptedSource::new(&[]);

        let selection = select_candidate(115.0, &mut pool, 15.0, &mut rng).unwrap();
        assert_eq!(selection.tier, SelectionTier::Fresh);
    }

    // Tests unused candidates are preferred over reused ones
    // Verified by merging tiers one and two
    #[test]
    fn test_fresh_preferred_over_reused() {
        let mut pool = pool_of(&[100.0, 105.0]);
        pool.set_max_usage(5);
        let mut rng = ScriptedSource::new(&[0, 0]);

        let first = select_candidate(100.0, &mut pool, 15.0, &mut rng).unwrap();
        assert_eq!(first.index, 0);

        let second = select_candidate(100.0, &mut pool, 15.0, &mut rng).unwrap();
        assert_eq!(second.index, 1, "the unused candidate must win");
        assert_eq!(second.tier, SelectionTier::Fresh);
        assert_eq!(usage(&pool), vec![1, 1]);
    }

    // Tests fairness holds across many random trials
    // Verified by choosing among all reusable candidates first
    #[test]
    fn test_fresh_preference_random_trials() {
        for seed in 0..200 {
            let mut pool = pool_of(&[90.0, 95.0, 100.0, 110.0]);
            pool.set_max_usage(3);
            let mut rng = RandomSelector::new(seed);

            for _ in 0..4 {
                let fresh_before = fresh_candidates(&pool, 100.0, 15.0);
                let selection = select_candidate(100.0, &mut pool, 15.0, &mut rng).unwrap();
                assert!(fresh_before.contains(&selection.index));
                assert_eq!(selection.tier, SelectionTier::Fresh);
            }
            assert_eq!(usage(&pool), vec![1, 1, 1, 1]);
        }
    }

    // Tests reuse below the cap once fresh candidates are exhausted
    // Verified by skipping the cap comparison in tier two
    #[test]
    fn test_reused_tier_respects_cap() {
        let mut pool = pool_of(&[100.0, 100.0, 100.0]);
        pool.set_max_usage(2);
        let mut rng = RandomSelector::new(3);

        let tiers: Vec<SelectionTier> = (0..5)
            .map(|_| select_candidate(100.0, &mut pool, 15.0, &mut rng).unwrap().tier)
            .collect();

        assert_eq!(
            tiers,
            vec![
                SelectionTier::Fresh,
                SelectionTier::Fresh,
                SelectionTier::Fresh,
                SelectionTier::Reused,
                SelectionTier::Reused,
            ]
        );
        assert_eq!(pool.total_usage(), 5);
        assert!(usage(&pool).iter().all(|&u| u <= 2));
        assert_eq!(usage(&pool).iter().filter(|&&u| u == 2).count(), 2);
    }

    // Tests closest fallback picks the first of equally distant candidates
    // Verified by using a non-strict comparison in the scan
    #[test]
    fn test_closest_tie_resolves_to_first() {
        let mut pool = pool_of(&[10.0, 250.0]);
        let mut rng = ScriptedSource::new(&[1, 1, 1]);

        let selection = select_candidate(130.0, &mut pool, 15.0, &mut rng).unwrap();

        assert_eq!(selection.index, 0);
        assert_eq!(selection.tier, SelectionTier::Closest);
        assert_eq!(usage(&pool), vec![1, 0]);
    }

    // Tests closest fallback minimises absolute difference
    // Verified by returning the first candidate unconditionally
    #[test]
    fn test_closest_minimises_distance() {
        let pool = pool_of(&[0.0, 200.0, 90.0, 60.0]);
        assert_eq!(closest_candidate(&pool, 80.0), Some(2));
        assert_eq!(closest_candidate(&pool, 255.0), Some(1));
        assert_eq!(closest_candidate(&pool, 5.0), Some(0));
    }

    // Tests closest fallback ignores the usage cap
    // Verified by filtering capped candidates in tier three
    #[test]
    fn test_closest_exceeds_cap() {
        let mut pool = pool_of(&[10.0, 250.0]);
        pool.set_max_usage(1);
        let mut rng = RandomSelector::new(0);

        for _ in 0..3 {
            select_candidate(20.0, &mut pool, 15.0, &mut rng).unwrap();
        }

        // First pick is fresh, the next two fall through to closest
        assert_eq!(usage(&pool), vec![3, 0]);
        assert!(pool.get(0).is_some_and(|c| c.usage_count() > pool.max_usage()));
    }

    // Tests capped candidates drop out of tier two but stay in tier one lists
    // Verified by reading the cap from the candidate instead of the pool
    #[test]
    fn test_candidate_lists() {
        let mut pool = pool_of(&[100.0, 104.0, 180.0]);
        pool.set_max_usage(1);
        let mut rng = ScriptedSource::new(&[0]);

        assert_eq!(fresh_candidates(&pool, 100.0, 15.0), vec![0, 1]);
        assert_eq!(reusable_candidates(&pool, 100.0, 15.0), vec![0, 1]);

        select_candidate(100.0, &mut pool, 15.0, &mut rng).unwrap();

        assert_eq!(fresh_candidates(&pool, 100.0, 15.0), vec![1]);
        assert_eq!(reusable_candidates(&pool, 100.0, 15.0), vec![1]);
    }

    // Tests the random source is not consulted when a tier is empty
    // Verified by drawing before checking for candidates
    #[test]
    fn test_empty_tiers_consume_no_randomness() {
        let mut pool = pool_of(&[100.0, 102.0, 250.0]);
        pool.set_max_usage(4);
        let mut rng = ScriptedSource::new(&[1, 1]);

        let first = select_candidate(0.0, &mut pool, 15.0, &mut rng).unwrap();
        assert_eq!((first.index, first.tier), (0, SelectionTier::Closest));

        let second = select_candidate(102.0, &mut pool, 5.0, &mut rng).unwrap();
        assert_eq!((second.index, second.tier), (1, SelectionTier::Fresh));

        // Only the second scripted pick is left for the two reusable candidates
        let third = select_candidate(101.0, &mut pool, 5.0, &mut rng).unwrap();
        assert_eq!((third.index, third.tier), (1, SelectionTier::Reused));
        assert_eq!(usage(&pool), vec![1, 2, 0]);
    }

    // Tests fresh picks are spread evenly across qualifying candidates
    // Verified by always choosing the first qualifier
    #[test]
    fn test_fresh_selection_uniform() {
        let mut counts = [0usize; 3];
        let mut rng = RandomSelector::new(2024);

        for _ in 0..3000 {
            let mut pool = pool_of(&[100.0, 100.0, 100.0]);
            let selection = select_candidate(100.0, &mut pool, 15.0, &mut rng).unwrap();
            if let Some(count) = counts.get_mut(selection.index) {
                *count += 1;
            }
        }

        for count in counts {
            assert!(
                (850..=1150).contains(&count),
                "selection counts not uniform: {counts:?}"
            );
        }
    }
}
