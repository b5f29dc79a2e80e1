//! Batch configuration.
//!
//! [`GrainOptions`] is a builder that carries the blend opacity, the
//! duration multiplier, the worker-pool size, the JPEG quality, and an
//! optional progress callback through the scheduler without polluting
//! every function signature.
//!
//! # Example
//!
//! ```
//! use filmgrain::GrainOptions;
//!
//! let options = GrainOptions::new(0.35)
//!     .with_duration_multiplier(3)
//!     .with_max_workers(8)
//!     .with_jpeg_quality(95);
//! assert!(options.validate().is_ok());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::error::GrainError;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Worker count used when none is given.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Duration multiplier used when none is given.
pub const DEFAULT_DURATION_MULTIPLIER: u32 = 1;

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Configuration for a grain batch.
///
/// Only the opacity is required; every other field has a named default
/// ([`DEFAULT_DURATION_MULTIPLIER`], [`DEFAULT_MAX_WORKERS`],
/// [`DEFAULT_JPEG_QUALITY`]). Builder methods store values as given;
/// [`validate`](GrainOptions::validate) rejects out-of-range settings and is
/// called by the scheduler before any work is submitted.
#[derive(Clone)]
#[must_use]
pub struct GrainOptions {
    pub(crate) opacity: f64,
    pub(crate) duration_multiplier: u32,
    pub(crate) max_workers: usize,
    pub(crate) jpeg_quality: u8,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for GrainOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GrainOptions")
            .field("opacity", &self.opacity)
            .field("duration_multiplier", &self.duration_multiplier)
            .field("max_workers", &self.max_workers)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("has_progress", &true)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl GrainOptions {
    /// Create options for the given grain opacity with default settings.
    pub fn new(opacity: f64) -> Self {
        Self {
            opacity,
            duration_multiplier: DEFAULT_DURATION_MULTIPLIER,
            max_workers: DEFAULT_MAX_WORKERS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Set the blend opacity (0.0 leaves the source untouched, 1.0 applies
    /// the full overlay).
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Repeat the source sequence `multiplier` times so that each repeat
    /// picks up different grain frames.
    pub fn with_duration_multiplier(mut self, multiplier: u32) -> Self {
        self.duration_multiplier = multiplier;
        self
    }

    /// Cap how many composites run at once.
    ///
    /// Each in-flight task holds two decoded images in memory; lower this
    /// if memory runs out. Throughput stops improving beyond the number of
    /// physical cores.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Set the JPEG quality (1–100) of the written composites.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Attach a progress callback, fired while waiting on the batch.
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires (every N finished tasks).
    /// Clamped to a minimum of 1.
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn duration_multiplier(&self) -> u32 {
        self.duration_multiplier
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Check every setting against its allowed range.
    ///
    /// # Errors
    ///
    /// [`GrainError::InvalidWorkerCount`] for zero workers,
    /// [`GrainError::InvalidDurationMultiplier`] for a zero multiplier,
    /// [`GrainError::InvalidOpacity`] for an opacity outside `0.0..=1.0`
    /// (including NaN), and [`GrainError::InvalidQuality`] for a JPEG quality
    /// outside `1..=100`.
    pub fn validate(&self) -> Result<(), GrainError> {
        if self.max_workers == 0 {
            return Err(GrainError::InvalidWorkerCount);
        }
        if self.duration_multiplier == 0 {
            return Err(GrainError::InvalidDurationMultiplier);
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(GrainError::InvalidOpacity(self.opacity));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(GrainError::InvalidQuality(self.jpeg_quality));
        }
        Ok(())
    }
}
