//! GrainOptions builder and validation tests.

use std::sync::Arc;

use filmgrain::{
    BatchScheduler, FrameSequence, GrainError, GrainOptions, ProgressCallback, ProgressInfo,
};

struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

// ── Builder ────────────────────────────────────────────────────────

#[test]
fn options_debug_output() {
    let options = GrainOptions::new(0.25);
    let debug = format!("{options:?}");
    assert!(debug.contains("GrainOptions"));
    assert!(debug.contains("opacity: 0.25"));
    assert!(debug.contains("max_workers: 4"));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn builder_sets_every_field() {
    let options = GrainOptions::new(0.1)
        .with_opacity(0.8)
        .with_duration_multiplier(3)
        .with_max_workers(12)
        .with_jpeg_quality(70)
        .with_progress(Arc::new(Silent))
        .with_batch_size(5);

    assert_eq!(options.opacity(), 0.8);
    assert_eq!(options.duration_multiplier(), 3);
    assert_eq!(options.max_workers(), 12);
    assert_eq!(options.jpeg_quality(), 70);
    assert!(format!("{options:?}").contains("batch_size: 5"));
}

#[test]
fn batch_size_clamps_zero() {
    let options = GrainOptions::new(0.5).with_batch_size(0);
    assert!(format!("{options:?}").contains("batch_size: 1"));
}

// ── Validation ─────────────────────────────────────────────────────

#[test]
fn zero_workers_rejected() {
    let result = GrainOptions::new(0.5).with_max_workers(0).validate();
    assert!(matches!(result, Err(GrainError::InvalidWorkerCount)));
}

#[test]
fn zero_multiplier_rejected() {
    let result = GrainOptions::new(0.5).with_duration_multiplier(0).validate();
    assert!(matches!(result, Err(GrainError::InvalidDurationMultiplier)));
}

#[test]
fn out_of_range_opacity_rejected() {
    for opacity in [-0.01, 1.5, f64::INFINITY, f64::NAN] {
        let result = GrainOptions::new(opacity).validate();
        assert!(
            matches!(result, Err(GrainError::InvalidOpacity(_))),
            "opacity {opacity} should be rejected"
        );
    }
}

#[test]
fn out_of_range_quality_rejected() {
    assert!(matches!(
        GrainOptions::new(0.5).with_jpeg_quality(0).validate(),
        Err(GrainError::InvalidQuality(0))
    ));
    assert!(matches!(
        GrainOptions::new(0.5).with_jpeg_quality(101).validate(),
        Err(GrainError::InvalidQuality(101))
    ));
}

// ── Preconditions at the scheduler ─────────────────────────────────

#[test]
fn scheduler_rejects_invalid_options_before_submitting() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let source = FrameSequence::single(directory.path().join("missing.png"));
    let grain = FrameSequence::single(directory.path().join("grain.png"));

    let scheduler = BatchScheduler::new(GrainOptions::new(2.0));
    let result = scheduler.run(&source, &grain, directory.path());
    assert!(matches!(result, Err(GrainError::InvalidOpacity(_))));

    // Nothing was attempted, so nothing was written.
    assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
}

#[test]
fn scheduler_rejects_empty_sequences() {
    let scheduler = BatchScheduler::new(GrainOptions::new(0.5));
    let frames = FrameSequence::single("frame.png");
    let empty = FrameSequence::default();

    match scheduler.run(&empty, &frames, "out") {
        Err(GrainError::EmptySequence { sequence }) => assert_eq!(sequence, "source"),
        Err(other) => panic!("Expected EmptySequence, got: {other}"),
        Ok(_) => panic!("Expected EmptySequence, got a batch"),
    }
    match scheduler.run(&frames, &empty, "out") {
        Err(GrainError::EmptySequence { sequence }) => assert_eq!(sequence, "grain"),
        Err(other) => panic!("Expected EmptySequence, got: {other}"),
        Ok(_) => panic!("Expected EmptySequence, got a batch"),
    }
}
