//! Error types for the `filmgrain` crate.
//!
//! This module defines [`GrainError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry enough context (file paths,
//! iteration numbers, image dimensions) to diagnose a failed frame from the
//! log line alone.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `filmgrain` operations.
///
/// Precondition violations (`EmptySequence`, `InvalidWorkerCount`, ...) are
/// raised by [`BatchScheduler::run`](crate::BatchScheduler::run) before any
/// work is submitted. Everything else is produced per task and ends up in a
/// [`TaskOutcome`](crate::TaskOutcome).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GrainError {
    /// A frame sequence that must be indexed has no entries.
    #[error("Empty sequence: {sequence} frames contain no images")]
    EmptySequence {
        /// Which sequence was empty (`"source"` or `"grain"`).
        sequence: &'static str,
    },

    /// The worker pool was configured with zero workers.
    #[error("Worker count must be greater than zero")]
    InvalidWorkerCount,

    /// The duration multiplier was zero.
    #[error("Duration multiplier must be greater than zero")]
    InvalidDurationMultiplier,

    /// The opacity was outside `0.0..=1.0` or not a finite number.
    #[error("Opacity {0} is outside the range 0.0..=1.0")]
    InvalidOpacity(f64),

    /// The JPEG quality was outside `1..=100`.
    #[error("JPEG quality {0} is outside the range 1..=100")]
    InvalidQuality(u8),

    /// `len(source) * duration_multiplier` does not fit the iteration counter.
    #[error("Iteration count overflows")]
    IterationOverflow,

    /// Base and grain images have different pixel dimensions.
    #[error("Dimension mismatch: base is {}x{}, grain is {}x{}", .base.0, .base.1, .grain.0, .grain.1)]
    DimensionMismatch {
        /// Base (source) image dimensions.
        base: (u32, u32),
        /// Grain image dimensions.
        grain: (u32, u32),
    },

    /// An input image could not be read or decoded.
    #[error("Failed to decode image at {path}: {reason}")]
    Decode {
        /// Path of the image that failed to decode.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The composite image could not be encoded or written.
    #[error("Failed to encode image to {path}: {reason}")]
    Encode {
        /// Target output path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A path expected to be a directory is not one.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    /// A worker panicked before reporting its outcome.
    #[error("Worker panicked while compositing iteration {0}")]
    WorkerPanicked(u64),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}
