//! Cross-module properties of partitioned execution and benchmarking.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rowband::executor::plan_segments;
use rowband::{
    BenchmarkHarness, Error, FilterRegistry, HarnessState, Image, ImageProcessor, OutputChannels,
    ParallelExecutor, PrimitiveError,
};

fn random_image(height: usize, width: usize, channels: usize, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    Image::from_fn(height, width, channels, |_, _, _| rng.gen::<u8>())
}

fn invert(band: Image) -> Result<Image, PrimitiveError> {
    let mut out = band;
    out.view_mut().mapv_inplace(|v| 255 - v);
    Ok(out)
}

#[test]
fn every_partitionable_builtin_is_thread_count_invariant() {
    let registry = Arc::new(FilterRegistry::with_builtins());
    let executor = ParallelExecutor::new(registry.clone());

    for (channels, seed) in [(3, 7), (1, 8), (4, 9)] {
        let img = random_image(29, 17, channels, seed);
        for name in registry.names() {
            if !registry.lookup(name).unwrap().partitionable() {
                continue;
            }
            let (reference, _) = executor.execute(name, &img, 1).unwrap();
            for threads in [2, 3, 5, 8, 29, 64] {
                let (out, _) = executor.execute(name, &img, threads).unwrap();
                assert_eq!(out, reference, "{name}, {channels} channels, {threads} threads");
            }
        }
    }
}

#[test]
fn non_partitionable_builtins_agree_across_thread_counts() {
    let registry = Arc::new(FilterRegistry::with_builtins());
    let executor = ParallelExecutor::new(registry);
    let img = random_image(12, 10, 3, 3);

    for name in ["fourier", "resize", "rotate"] {
        let (single, _) = executor.execute(name, &img, 1).unwrap();
        let (multi, _) = executor.execute(name, &img, 6).unwrap();
        assert_eq!(single, multi, "{name}");
    }
}

#[test]
fn pointwise_filter_equals_direct_invocation() {
    let mut registry = FilterRegistry::new();
    registry
        .register("invert", invert, 0, true, OutputChannels::SameAsInput)
        .unwrap();
    let executor = ParallelExecutor::new(Arc::new(registry));

    let img = random_image(31, 9, 3, 11);
    let direct = invert(img.clone()).unwrap();
    for threads in [1, 4, 31] {
        let (out, _) = executor.execute("invert", &img, threads).unwrap();
        assert_eq!(out, direct, "{threads} threads");
    }
}

#[test]
fn unknown_filter_leaves_thread_count_unchanged() {
    let processor = ImageProcessor::new(Arc::new(FilterRegistry::with_builtins()), 3);
    let err = processor
        .apply_filter("sharpen", &random_image(4, 4, 3, 1))
        .unwrap_err();

    assert!(matches!(err, Error::UnknownFilter(name) if name == "sharpen"));
    assert_eq!(processor.thread_count(), 3);
}

#[test]
fn empty_image_never_invokes_primitive() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut registry = FilterRegistry::new();
    registry
        .register(
            "counted",
            move |band: Image| -> Result<Image, PrimitiveError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(band)
            },
            1,
            true,
            OutputChannels::SameAsInput,
        )
        .unwrap();
    let executor = ParallelExecutor::new(Arc::new(registry));

    for img in [Image::zeros(0, 5, 3), Image::zeros(5, 0, 3), Image::zeros(5, 5, 0)] {
        for threads in [1, 4] {
            let err = executor.execute("counted", &img, threads).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_band_is_reported_after_all_bands_join() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut registry = FilterRegistry::new();
    registry
        .register(
            "fragile",
            move |band: Image| -> Result<Image, PrimitiveError> {
                counter.fetch_add(1, Ordering::SeqCst);
                if band.view()[[0, 0, 0]] == 80 {
                    return Err(PrimitiveError::new("bad band"));
                }
                Ok(band)
            },
            0,
            true,
            OutputChannels::SameAsInput,
        )
        .unwrap();
    let executor = ParallelExecutor::new(Arc::new(registry));

    // Bands start at rows 0, 2, 4, 6; the one starting at row 2 fails
    let img = Image::from_fn(8, 3, 1, |y, _, _| (y * 40) as u8);
    let err = executor.execute("fragile", &img, 4).unwrap_err();

    assert!(matches!(
        err,
        Error::PrimitiveFailure { filter, message } if filter == "fragile" && message == "bad band"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn planner_example_and_coverage() {
    let segments = plan_segments(100, 4, 2);
    let cores: Vec<_> = segments.iter().map(|s| (s.band_start, s.band_end)).collect();
    let exts: Vec<_> = segments.iter().map(|s| (s.ext_start, s.ext_end)).collect();
    assert_eq!(cores, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
    assert_eq!(exts, vec![(0, 27), (23, 52), (48, 77), (73, 100)]);

    for height in 1..40 {
        for threads in 0..45 {
            let segments = plan_segments(height, threads, 3);
            let mut next = 0;
            for s in &segments {
                assert_eq!(s.band_start, next);
                assert!(s.band_end > s.band_start);
                next = s.band_end;
            }
            assert_eq!(next, height);
        }
    }
}

#[test]
fn benchmark_reports_one_point_per_thread_count() {
    let mut registry = FilterRegistry::new();
    registry
        .register("f", invert, 0, true, OutputChannels::SameAsInput)
        .unwrap();
    let harness = BenchmarkHarness::new(Arc::new(registry));

    let results = harness
        .run_benchmark(&random_image(40, 30, 3, 5), &["f"], 1..=5, 3)
        .unwrap();
    let series = results.get("f").unwrap();
    assert_eq!(series.points.len(), 5);
    assert!(series.points.iter().all(|p| p.trial_durations.len() == 3));

    let min = series
        .points
        .iter()
        .map(|p| p.mean_duration)
        .fold(f64::INFINITY, f64::min);
    let expected_best = series
        .points
        .iter()
        .find(|p| p.mean_duration == min)
        .map(|p| p.thread_count)
        .unwrap();
    assert_eq!(series.summary().unwrap().best_thread_count, expected_best);
    assert!(matches!(harness.state(), HarnessState::Completed(_)));
}

#[test]
fn concurrent_run_is_rejected_as_busy() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let (entered_in, release_in) = (entered.clone(), release.clone());

    let mut registry = FilterRegistry::new();
    registry
        .register(
            "slow",
            move |band: Image| -> Result<Image, PrimitiveError> {
                entered_in.wait();
                release_in.wait();
                Ok(band)
            },
            0,
            true,
            OutputChannels::SameAsInput,
        )
        .unwrap();
    let harness = BenchmarkHarness::new(Arc::new(registry));
    let img = random_image(4, 4, 1, 2);

    thread::scope(|s| {
        let first = s.spawn(|| harness.run_benchmark(&img, &["slow"], 1..=1, 1));

        entered.wait();
        assert!(matches!(harness.state(), HarnessState::Running { .. }));
        let err = harness.run_benchmark(&img, &["slow"], 1..=1, 1).unwrap_err();
        assert!(matches!(err, Error::BenchmarkBusy));
        release.wait();

        let results = first.join().unwrap().unwrap();
        assert_eq!(results.get("slow").unwrap().points.len(), 1);
    });
    assert!(matches!(harness.state(), HarnessState::Completed(_)));
}
