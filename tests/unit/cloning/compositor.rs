//! Tests for channel orchestration, placement and failure reporting

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3, Axis, s};
    use seamclone::cloning::compositor::{CloneConfig, PatchCompositor};
    use seamclone::cloning::guidance::CloneMode;
    use seamclone::CloneError;
    use seamclone::cloning::solver::SolverSettings;
    use seamclone::operators::cache::CacheStats;

    fn plane(rows: usize, cols: usize, seed: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(i, j)| {
            0.5 + 0.4 * ((i * 7 + j * 3 + seed) as f64).sin()
        })
    }

    fn image(rows: usize, cols: usize, channels: usize, seed: usize) -> Array3<f64> {
        Array3::from_shape_fn((rows, cols, channels), |(i, j, c)| {
            0.5 + 0.4 * ((i * 5 + j * 11 + c * 13 + seed) as f64).cos()
        })
    }

    fn assert_perimeter_matches(
        result: &Array2<f64>,
        target: &Array2<f64>,
        (top, left): (usize, usize),
        (rows, cols): (usize, usize),
    ) {
        for i in 0..rows {
            for j in 0..cols {
                if i == 0 || j == 0 || i + 1 == rows || j + 1 == cols {
                    let (r, c) = (top + i, left + j);
                    assert_eq!(
                        result[[r, c]].to_bits(),
                        target[[r, c]].to_bits(),
                        "perimeter pixel ({r}, {c}) changed"
                    );
                }
            }
        }
    }

    // Tests naive cloning copies the source verbatim without solving
    // Verified by clipping the pasted values
    #[test]
    fn test_naive_replaces_region() {
        let target = plane(6, 7, 1);
        let mut source = plane(3, 2, 4);
        source[[0, 0]] = 1.5;
        let mut compositor = PatchCompositor::new(CloneConfig::with_mode(CloneMode::Naive));

        let composite = compositor
            .composite_plane(target.view(), source.view(), (2, 4))
            .expect("Naive clone succeeds");

        assert!(composite.reports.is_empty());
        assert_eq!(composite.image.slice(s![2..5, 4..6]), source);
        assert_eq!(composite.image.slice(s![0..2, ..]), target.slice(s![0..2, ..]));
        assert_eq!(composite.image.slice(s![.., 0..4]), target.slice(s![.., 0..4]));
        assert_eq!(compositor.cache_stats(), CacheStats::default());
    }

    // Tests the perimeter of the patch keeps the target's pixels exactly
    // Verified by warm starting without seeding the boundary
    #[test]
    fn test_guided_modes_keep_target_perimeter() {
        let target = plane(9, 10, 2);
        let source = plane(5, 6, 9);

        for mode in [CloneMode::Laplacian, CloneMode::Mixed] {
            let mut compositor = PatchCompositor::new(CloneConfig::with_mode(mode));
            let composite = compositor
                .composite_plane(target.view(), source.view(), (2, 3))
                .expect("Clone succeeds");

            assert_eq!(composite.reports.len(), 1);
            assert_perimeter_matches(&composite.image, &target, (2, 3), (5, 6));
            assert_eq!(composite.image.slice(s![0..2, ..]), target.slice(s![0..2, ..]));
            assert_eq!(composite.image.slice(s![7.., ..]), target.slice(s![7.., ..]));
        }
    }

    // Tests every output value lies in the unit interval
    // Verified by skipping the final clip
    #[test]
    fn test_output_is_clipped() {
        let target =
            Array2::from_shape_fn((8, 8), |(i, j)| if (i + j) % 2 == 0 { 0.0 } else { 1.0 });
        let source =
            Array2::from_shape_fn((6, 6), |(i, j)| if (i * j) % 3 == 0 { 1.0 } else { 0.0 });

        for mode in [CloneMode::Laplacian, CloneMode::Mixed] {
            let mut compositor = PatchCompositor::new(CloneConfig::with_mode(mode));
            let composite = compositor
                .composite_plane(target.view(), source.view(), (1, 1))
                .expect("Clone succeeds");
            assert!(composite.image.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    // Tests out-of-bounds placement fails before any work
    // Verified by clamping the patch into the target
    #[test]
    fn test_out_of_bounds() {
        let target = image(5, 5, 3, 0);
        let source = image(3, 3, 3, 1);
        let mut compositor = PatchCompositor::new(CloneConfig::default());

        let result = compositor.composite(target.view(), source.view(), (3, 1));
        assert!(matches!(
            result,
            Err(CloneError::OutOfBounds {
                region: (3, 1, 3, 3),
                target: (5, 5)
            })
        ));
        assert_eq!(compositor.cache_stats(), CacheStats::default());
        assert_eq!(target, image(5, 5, 3, 0));
    }

    // Tests non-finite pixels are reported in image coordinates
    // Verified by reporting coordinates relative to the patch
    #[test]
    fn test_non_finite_inputs() {
        let mut compositor = PatchCompositor::new(CloneConfig::default());

        let target = plane(6, 6, 0);
        let mut source = plane(3, 3, 1);
        source[[1, 2]] = f64::NAN;
        assert!(matches!(
            compositor.composite_plane(target.view(), source.view(), (1, 1)),
            Err(CloneError::NonFiniteInput {
                image: "source",
                row: 1,
                col: 2
            })
        ));

        let mut target = plane(6, 6, 0);
        target[[3, 2]] = f64::INFINITY;
        let source = plane(3, 3, 1);
        assert!(matches!(
            compositor.composite_plane(target.view(), source.view(), (2, 2)),
            Err(CloneError::NonFiniteInput {
                image: "target",
                row: 3,
                col: 2
            })
        ));
    }

    // Tests non-finite target pixels away from the patch are still rejected
    // Verified by scanning only the covered region of the target
    #[test]
    fn test_non_finite_outside_patch_is_rejected() {
        let mut target = image(6, 6, 2, 0);
        target[[0, 5, 1]] = f64::NAN;
        let source = image(3, 3, 2, 1);

        for mode in [CloneMode::Naive, CloneMode::Laplacian] {
            let mut compositor = PatchCompositor::new(CloneConfig::with_mode(mode));
            assert!(matches!(
                compositor.composite(target.view(), source.view(), (2, 2)),
                Err(CloneError::NonFiniteInput {
                    image: "target",
                    row: 0,
                    col: 5
                })
            ));
            assert_eq!(compositor.cache_stats(), CacheStats::default());
        }
    }

    // Tests an exhausted iteration budget surfaces as an error
    // Verified by returning the partial iterate
    #[test]
    fn test_non_convergence_is_an_error() {
        let config = CloneConfig {
            mode: CloneMode::Laplacian,
            solver: SolverSettings {
                tolerance: 1e-10,
                max_iterations: 1,
            },
            parallel: false,
        };
        let target = plane(12, 12, 3);
        let source = plane(8, 8, 17);
        let mut compositor = PatchCompositor::new(config);

        assert!(matches!(
            compositor.composite_plane(target.view(), source.view(), (2, 2)),
            Err(CloneError::NonConvergence {
                channel: 0,
                iterations: 1,
                ..
            })
        ));
    }

    // Tests mismatched channel counts are rejected
    // Verified by cloning only the shared channels
    #[test]
    fn test_channel_mismatch() {
        let target = image(6, 6, 3, 0);
        let source = image(3, 3, 1, 0);
        let mut compositor = PatchCompositor::new(CloneConfig::default());

        assert!(matches!(
            compositor.composite(target.view(), source.view(), (0, 0)),
            Err(CloneError::ChannelMismatch {
                target: 3,
                source: 1
            })
        ));

        let empty = Array3::<f64>::zeros((6, 6, 0));
        let empty_source = Array3::<f64>::zeros((3, 3, 0));
        assert!(matches!(
            compositor.composite(empty.view(), empty_source.view(), (0, 0)),
            Err(CloneError::InvalidParameter { .. })
        ));
    }

    // Tests an invalid tolerance is rejected before solving
    // Verified by validating settings only inside the solver
    #[test]
    fn test_invalid_tolerance() {
        let mut config = CloneConfig::default();
        config.solver.tolerance = -1.0;
        let mut compositor = PatchCompositor::new(config);
        let target = plane(5, 5, 0);
        let source = plane(3, 3, 0);

        assert!(matches!(
            compositor.composite_plane(target.view(), source.view(), (1, 1)),
            Err(CloneError::InvalidParameter { .. })
        ));
        assert_eq!(compositor.cache_stats(), CacheStats::default());
    }

    // Tests naive cloning ignores solver settings it never uses
    // Verified by validating the settings for every mode
    #[test]
    fn test_naive_skips_solver_validation() {
        let mut config = CloneConfig::with_mode(CloneMode::Naive);
        config.solver.tolerance = 0.0;
        config.solver.max_iterations = 0;
        let mut compositor = PatchCompositor::new(config);
        let target = plane(5, 5, 0);
        let source = plane(2, 3, 4);

        let composite = compositor
            .composite_plane(target.view(), source.view(), (1, 2))
            .expect("Naive clone succeeds");
        assert_eq!(composite.image.slice(s![1..3, 2..5]), source);
        assert!(composite.reports.is_empty());

        let mut guided = PatchCompositor::new(CloneConfig {
            mode: CloneMode::Laplacian,
            ..config
        });
        assert!(matches!(
            guided.composite_plane(target.view(), source.view(), (1, 2)),
            Err(CloneError::InvalidParameter { .. })
        ));
    }

    // Tests parallel, sequential and per-plane clones agree exactly
    // Verified by sharing one right-hand side across channels
    #[test]
    fn test_channel_dispatch_is_deterministic() {
        let target = image(10, 9, 3, 2);
        let source = image(6, 5, 3, 7);
        let offset = (2, 3);

        let mut parallel = PatchCompositor::new(CloneConfig::default());
        let mut sequential = PatchCompositor::new(CloneConfig {
            parallel: false,
            ..CloneConfig::default()
        });
        let parallel = parallel
            .composite(target.view(), source.view(), offset)
            .expect("Parallel clone succeeds");
        let sequential = sequential
            .composite(target.view(), source.view(), offset)
            .expect("Sequential clone succeeds");

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.image.dim(), (10, 9, 3));
        assert_eq!(parallel.reports.len(), 3);
        for (index, report) in parallel.reports.iter().enumerate() {
            assert_eq!(report.channel, index);
        }

        let mut single = PatchCompositor::new(CloneConfig::default());
        for channel in 0..3 {
            let plane = single
                .composite_plane(
                    target.index_axis(Axis(2), channel),
                    source.index_axis(Axis(2), channel),
                    offset,
                )
                .expect("Plane clone succeeds");
            assert_eq!(plane.image, parallel.image.index_axis(Axis(2), channel));
        }
    }

    // Tests operators are built once per patch size
    // Verified by clearing the cache between clones
    #[test]
    fn test_operators_are_reused() {
        let target = image(8, 8, 3, 0);
        let mut compositor = PatchCompositor::new(CloneConfig::default());

        compositor
            .composite(target.view(), image(4, 4, 3, 1).view(), (0, 0))
            .expect("Clone succeeds");
        compositor
            .composite(target.view(), image(4, 4, 3, 2).view(), (4, 4))
            .expect("Clone succeeds");
        assert_eq!(compositor.cache_stats(), CacheStats { hits: 1, misses: 1 });

        compositor
            .composite(target.view(), image(3, 4, 3, 2).view(), (1, 1))
            .expect("Clone succeeds");
        assert_eq!(compositor.cache_stats(), CacheStats { hits: 1, misses: 2 });
    }

    // Tests a single-row patch is all boundary and keeps the target
    // Verified by treating the first row as interior
    #[test]
    fn test_thin_patch_keeps_target() {
        let target = plane(5, 8, 4);
        let source = plane(1, 6, 11);

        for mode in [CloneMode::Laplacian, CloneMode::Mixed] {
            let mut compositor = PatchCompositor::new(CloneConfig::with_mode(mode));
            let composite = compositor
                .composite_plane(target.view(), source.view(), (2, 1))
                .expect("Clone succeeds");
            assert_eq!(composite.image, target);
            assert_eq!(composite.reports[0].iterations, 0);
        }
    }
}
