//! End-to-end runs of the recovery pipeline on synthetic composites.
//!
//! The 2×2 scene spans 1984–2021 with two years never acquired:
//!
//! | pixel | behaviour                                              |
//! |-------|--------------------------------------------------------|
//! | 0     | 0.6 before the eruption, then 0.1 + 0.3·log10(t)       |
//! | 1     | 0.6 before, then flat around 0.1 (no trend)            |
//! | 2     | 0.6 throughout (never disturbed)                       |
//! | 3     | observed only in 1985, 1986 and 1995 (too sparse)      |

use approx::assert_relative_eq;
use ndarray::Array1;
use regrowth_algorithms::prelude::*;

const MISSING_YEARS: [i32; 2] = [1988, 2003];

fn scene_value(pixel: usize, year: i32) -> f64 {
    let t = (year - 1995) as f64;
    match pixel {
        0 | 1 if year < 1990 => 0.6,
        0 | 1 if year < 1995 => 0.05,
        0 if year == 1995 => 0.1,
        0 => 0.1 + 0.3 * t.log10(),
        1 => 0.1 + 0.02 * ((year % 2) as f64),
        2 => 0.6,
        _ => match year {
            1985 | 1986 => 0.6,
            1995 => 0.1,
            _ => f64::NAN,
        },
    }
}

fn scene() -> Vec<YearPlane> {
    (1984..=2021)
        .filter(|y| !MISSING_YEARS.contains(y))
        .map(|year| {
            let values = (0..4).map(|p| scene_value(p, year)).collect();
            YearPlane::new(year, Raster::from_vec(values, 2, 2).unwrap())
        })
        .collect()
}

#[test]
fn test_sparse_example_pixel_is_valid_but_not_disturbed() {
    // 1984, 1985, 1986, 1990, 1995, 1996 with values 1, 2, 3, 5, 10, 11
    let planes: Vec<_> = [
        (1984, 1.0),
        (1985, 2.0),
        (1986, 3.0),
        (1990, 5.0),
        (1995, 10.0),
        (1996, 11.0),
    ]
    .into_iter()
    .map(|(year, v)| YearPlane::new(year, Raster::filled(1, 1, v)))
    .collect();

    let stack = build_image_stack(&planes, None).unwrap();
    let filled = fill_missing_years(&stack).unwrap();
    assert_eq!(filled.depth(), 13);

    let valid = valid_pixel_mask(&filled, &ValidityParams::default());
    assert!(valid[0], "7 missing years is below 20");

    let table = reshape_image_stack(&filled).unwrap();
    assert_eq!(table.n_years(), 13);
    assert_eq!(table.pixel_series(0).iter().filter(|v| v.is_nan()).count(), 7);
    assert_eq!(table.years().row(0).to_vec(), (1984..=1996).collect::<Vec<_>>());

    // baseline 2.5, post-event 10: vegetation went up, so not disturbed
    let disturbed =
        disturbed_pixel_mask(&table, &EventAnchors::default(), &DisturbanceParams::default())
            .unwrap();
    assert!(!disturbed[0]);

    let out = RecoveryPipeline.execute_default(planes).unwrap();
    assert_eq!(out.summary.kept, 0);
    assert!(out.metrics.years_to_recovery[0].is_nan());
}

#[test]
fn test_recovering_pixel_gets_all_metrics() {
    let out = RecoveryPipeline.execute_default(scene()).unwrap();

    assert_eq!(
        out.summary,
        PipelineSummary {
            total: 4,
            valid: 3,
            disturbed: 3,
            kept: 2,
            fitted: 2,
            significant: 1,
        }
    );

    let fit = out.fits.record(0);
    assert_relative_eq!(fit.slope, 0.3, epsilon = 1e-9);
    assert_relative_eq!(fit.intercept, 0.1, epsilon = 1e-9);
    assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
    assert!(fit.p_value < 0.05);

    let m = &out.metrics;
    // 0.8 × 0.6 = 0.48 is reached at 10^(0.38 / 0.3) ≈ 18.5
    assert_eq!(m.years_to_recovery[0], 18.0);
    assert_relative_eq!(m.slope[0], 0.3, epsilon = 1e-9);
    assert_relative_eq!(m.abs_regrowth[0], 0.3 * 5f64.log10(), epsilon = 1e-9);
    assert_relative_eq!(out.dvi[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(m.rel_regrowth[0], 0.3 * 5f64.log10() / 0.5, epsilon = 1e-9);

    // flat regrowth is fitted but not significant
    assert!(out.fits.record(1).is_fitted());
    for (name, values) in m.layers() {
        assert!(values[1].is_nan(), "{} of flat pixel", name);
        assert!(values[2].is_nan(), "{} of undisturbed pixel", name);
        assert!(values[3].is_nan(), "{} of sparse pixel", name);
    }
}

#[test]
fn test_filtered_pixels_keep_their_years() {
    let out = RecoveryPipeline.execute_default(scene()).unwrap();
    let combined = out.clean.combined();
    assert_eq!(combined.dim(), (4, 38, 2));

    for pixel in [2, 3] {
        for j in 0..38 {
            assert_eq!(combined[[pixel, j, 0]], (1984 + j as i32) as f64);
            assert!(combined[[pixel, j, 1]].is_nan());
        }
    }
    // missing acquisitions stay missing in kept pixels
    assert!(combined[[0, 1988 - 1984, 1]].is_nan());
    assert_eq!(combined[[0, 1985 - 1984, 1]], 0.6);
}

#[test]
fn test_metric_rasters_match_grid() {
    let out = RecoveryPipeline.execute_default(scene()).unwrap();
    let rasters = out.metrics.to_rasters().unwrap();
    assert_eq!(rasters.len(), 4);
    for (_, raster) in &rasters {
        assert_eq!(raster.shape(), (2, 2));
    }
    let (name, years) = &rasters[0];
    assert_eq!(*name, "years_to_recovery");
    assert_eq!(years.get(0, 0).unwrap(), 18.0);
    assert!(years.get(1, 1).unwrap().is_nan());
}

#[test]
fn test_results_identical_across_processing_modes() {
    let reference = {
        let mut config = PipelineConfig::default();
        config.trend.mode = ProcessingMode::Sequential;
        RecoveryPipeline.execute(scene(), config).unwrap()
    };

    for (mode, batch_size) in [
        (ProcessingMode::Parallel, None),
        (ProcessingMode::ParallelWith(2), Some(1)),
        (ProcessingMode::Parallel, Some(3)),
    ] {
        let mut config = PipelineConfig::default();
        config.trend.mode = mode;
        config.trend.batch_size = batch_size;
        let out = RecoveryPipeline.execute(scene(), config).unwrap();

        let same_bits = |a: &Array1<f64>, b: &Array1<f64>| {
            a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
        };
        assert!(out
            .fits
            .data()
            .iter()
            .zip(reference.fits.data().iter())
            .all(|(x, y)| x.to_bits() == y.to_bits()));
        for ((_, a), (_, b)) in out.metrics.layers().iter().zip(reference.metrics.layers().iter()) {
            assert!(same_bits(a, b), "{:?} / {:?}", mode, batch_size);
        }
    }
}

#[test]
fn test_recovery_bound_is_configurable() {
    let mut config = PipelineConfig::default();
    config.recovery.max_recovery_years = 15.0;
    let out = RecoveryPipeline.execute(scene(), config).unwrap();
    // position 18 is now "never recovers"; the other metrics are unaffected
    assert!(out.metrics.years_to_recovery[0].is_nan());
    assert_relative_eq!(out.metrics.slope[0], 0.3, epsilon = 1e-9);

    let mut config = PipelineConfig::default();
    config.recovery.target_fraction = 0.5;
    let out = RecoveryPipeline.execute(scene(), config).unwrap();
    // 0.3 reached at 10^(0.2 / 0.3) ≈ 4.6
    assert_eq!(out.metrics.years_to_recovery[0], 5.0);
}

#[test]
fn test_anchor_outside_scene_is_fatal() {
    let mut config = PipelineConfig::default();
    config.anchors.post_event_year = 2030;
    let err = RecoveryPipeline.execute(scene(), config).unwrap_err();
    assert!(matches!(err, Error::InvalidIndex { year: 2030, first: 1984, last: 2021 }));
}
