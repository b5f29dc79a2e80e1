//! Progress reporting for grain batches.
//!
//! This module provides [`ProgressCallback`] for monitoring a running batch
//! and [`ProgressInfo`] for detailed progress snapshots. Callbacks fire on
//! the thread that waits on the [`BatchHandle`](crate::BatchHandle), in
//! completion order, never from the worker pool itself.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use filmgrain::{
//!     BatchScheduler, FrameSequence, GrainError, GrainOptions, ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% complete ({} failed)", info.failed);
//!         }
//!     }
//! }
//!
//! let source = FrameSequence::from_directory("frames")?;
//! let grain = FrameSequence::from_directory("grain")?;
//! let options = GrainOptions::new(0.3).with_progress(Arc::new(PrintProgress));
//!
//! let report = BatchScheduler::new(options).run(&source, &grain, "out")?.wait();
//! # Ok::<(), GrainError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of batch progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled
/// by [`GrainOptions::with_batch_size`](crate::GrainOptions::with_batch_size).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many tasks have finished so far (successfully or not).
    pub current: u64,
    /// Total number of tasks submitted.
    pub total: u64,
    /// Tasks that wrote their output file.
    pub succeeded: u64,
    /// Tasks that failed and were skipped.
    pub failed: u64,
    /// Completion percentage (0.0 – 100.0). `None` for an empty batch.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since waiting started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// The iteration whose completion triggered this report.
    pub last_iteration: Option<u64>,
}

/// Trait for receiving progress updates while a batch completes.
///
/// Implementations must be [`Send`] and [`Sync`] because the options that
/// carry them are shared with the scheduler.
///
/// Progress callbacks are **infallible**: they observe but cannot halt
/// the batch.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while tasks complete.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    current: u64,
    succeeded: u64,
    failed: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64, batch_size: u64) -> Self {
        Self {
            callback,
            total,
            current: 0,
            succeeded: 0,
            failed: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one finished task and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, iteration: u64, success: bool) {
        self.current += 1;
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(Some(iteration));
            self.items_since_last_report = 0;
        }
    }

    /// Count a task that never reported back.
    pub(crate) fn record_missing(&mut self, count: u64) {
        self.current += count;
        self.failed += count;
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, iteration: Option<u64>) {
        let elapsed = self.start_time.elapsed();

        let percentage =
            (self.total > 0).then(|| (self.current as f32 / self.total as f32) * 100.0);

        let estimated_remaining = (self.current > 0).then(|| {
            let remaining = self.total.saturating_sub(self.current);
            let per_item = elapsed / self.current as u32;
            per_item * remaining as u32
        });

        let info = ProgressInfo {
            current: self.current,
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            percentage,
            elapsed,
            estimated_remaining,
            last_iteration: iteration,
        };

        self.callback.on_progress(&info);
    }
}
