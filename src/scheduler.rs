//! Bounded-parallel grain batches.
//!
//! [`BatchScheduler::run`] validates its inputs, builds a dedicated worker
//! pool of exactly [`max_workers`](crate::GrainOptions::with_max_workers)
//! threads, submits one [`CompositeTask`] per output iteration, and returns
//! a [`BatchHandle`] as soon as everything is submitted. Tasks may still be
//! queued or running at that point.
//!
//! The handle is the only link to the running work:
//!
//! - [`BatchHandle::wait`] blocks until every task has finished and returns
//!   a [`BatchReport`] with one [`TaskOutcome`] per iteration.
//! - Dropping the handle detaches the batch. Submitted tasks still run to
//!   completion in the background; their outcomes are only logged.
//!
//! Tasks never share mutable state. Each one derives its frame pair from its
//! own iteration number and writes its own `<iteration>.jpg`, so completion
//! order does not matter.
//!
//! # Example
//!
//! ```no_run
//! use filmgrain::{BatchScheduler, FrameSequence, GrainError, GrainOptions};
//!
//! let source = FrameSequence::from_directory("frames")?;
//! let grain = FrameSequence::from_directory("grain")?;
//! let options = GrainOptions::new(0.25).with_max_workers(8);
//!
//! let report = BatchScheduler::new(options).run(&source, &grain, "out")?.wait();
//! for failure in report.failures() {
//!     eprintln!("iteration {} failed", failure.iteration);
//! }
//! # Ok::<(), GrainError>(())
//! ```

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::blend::{Blend, OverlayBlend};
use crate::codec::{FrameCodec, JpegCodec};
use crate::configuration::GrainOptions;
use crate::error::GrainError;
use crate::indexer::{resolve, total_iterations};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::sequence::FrameSequence;
use crate::worker::{self, CompositeTask, TaskOutcome};

/// Dispatches composite tasks across a bounded worker pool.
///
/// The scheduler holds only configuration and shared, immutable
/// collaborators; it can be reused for any number of batches.
#[derive(Clone)]
pub struct BatchScheduler {
    options: GrainOptions,
    codec: Arc<dyn FrameCodec>,
    blend: Arc<dyn Blend>,
}

impl BatchScheduler {
    /// Create a scheduler using [`JpegCodec`] (at the configured quality)
    /// and [`OverlayBlend`].
    pub fn new(options: GrainOptions) -> Self {
        let codec = Arc::new(JpegCodec::new(options.jpeg_quality));
        Self {
            options,
            codec,
            blend: Arc::new(OverlayBlend),
        }
    }

    /// Replace the codec used to read inputs and write composites.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn FrameCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the blend applied to each (source, grain) pair.
    #[must_use]
    pub fn with_blend(mut self, blend: Arc<dyn Blend>) -> Self {
        self.blend = blend;
        self
    }

    pub fn options(&self) -> &GrainOptions {
        &self.options
    }

    /// Submit one composite per iteration in
    /// `0..len(source) * duration_multiplier` and return without waiting.
    ///
    /// Iteration `i` overlays grain frame `i mod len(grain)` onto source
    /// frame `i mod len(source)` and writes `<output_folder>/<i>.jpg`,
    /// silently replacing any file already there. The output folder must
    /// already exist.
    ///
    /// At most `max_workers` tasks run at once; the rest wait in the pool's
    /// unbounded queue. The pool stops accepting work once this call
    /// returns and shuts down after its queue drains.
    ///
    /// # Errors
    ///
    /// Fails before submitting anything if the options are invalid (see
    /// [`GrainOptions::validate`]), if either sequence is empty
    /// ([`GrainError::EmptySequence`]), or if the worker pool cannot be
    /// created. Per-task failures are never returned here; they show up in
    /// the [`BatchReport`].
    pub fn run<P: AsRef<Path>>(
        &self,
        source: &FrameSequence,
        grain: &FrameSequence,
        output_folder: P,
    ) -> Result<BatchHandle, GrainError> {
        self.options.validate()?;
        if source.is_empty() {
            return Err(GrainError::EmptySequence { sequence: "source" });
        }
        if grain.is_empty() {
            return Err(GrainError::EmptySequence { sequence: "grain" });
        }

        let output_folder = output_folder.as_ref().to_path_buf();
        let total = total_iterations(source.len(), self.options.duration_multiplier)?;
        let task_count = u64::try_from(total).map_err(|_| GrainError::IterationOverflow)?;
        let pool = build_pool(self.options.max_workers)?;

        log::debug!(
            "Scheduling {total} composite(s) from {} source and {} grain frame(s) on {} worker(s)",
            source.len(),
            grain.len(),
            self.options.max_workers
        );

        let (sender, receiver) = mpsc::channel();
        for iteration in 0..task_count {
            let index = i64::try_from(iteration).map_err(|_| GrainError::IterationOverflow)?;
            let pair = resolve(index, source.len(), grain.len())?;
            let task = CompositeTask {
                iteration,
                source: source.frame(pair.source).to_path_buf(),
                grain: grain.frame(pair.grain).to_path_buf(),
                output_folder: output_folder.clone(),
                opacity: self.options.opacity,
            };

            let codec = Arc::clone(&self.codec);
            let blend = Arc::clone(&self.blend);
            let sender = sender.clone();
            pool.spawn(move || {
                let outcome = worker::execute(&task, codec.as_ref(), blend.as_ref());
                // The handle may have been dropped; the outcome is already logged.
                let _ = sender.send(outcome);
            });
        }

        Ok(BatchHandle {
            receiver,
            total: task_count,
            output_folder,
            progress: Arc::clone(&self.options.progress),
            batch_size: self.options.batch_size,
        })
    }
}

fn build_pool(workers: usize) -> Result<ThreadPool, GrainError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("filmgrain-worker-{index}"))
        .panic_handler(|payload| {
            log::warn!("Composite worker panicked: {}", panic_message(payload.as_ref()));
        })
        .build()
        .map_err(|error| GrainError::ThreadPool(error.to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}

/// Handle to a submitted batch.
///
/// Returned by [`BatchScheduler::run`]. Call [`wait`](BatchHandle::wait) to
/// block until all tasks have finished, or drop it to let the batch finish
/// in the background.
pub struct BatchHandle {
    receiver: Receiver<TaskOutcome>,
    total: u64,
    output_folder: PathBuf,
    progress: Arc<dyn ProgressCallback>,
    batch_size: u64,
}

impl BatchHandle {
    /// Number of tasks submitted.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// Block until every submitted task has finished.
    ///
    /// Progress callbacks from the options fire on the calling thread as
    /// outcomes arrive. A task whose worker panicked is reported as
    /// [`GrainError::WorkerPanicked`].
    pub fn wait(self) -> BatchReport {
        let start = Instant::now();
        let mut tracker = ProgressTracker::new(self.progress, self.total, self.batch_size);
        let mut outcomes: Vec<TaskOutcome> = Vec::with_capacity(self.total as usize);

        for outcome in self.receiver.iter() {
            tracker.advance(outcome.iteration, outcome.is_success());
            outcomes.push(outcome);
        }

        if (outcomes.len() as u64) < self.total {
            let mut reported = vec![false; self.total as usize];
            for outcome in &outcomes {
                reported[outcome.iteration as usize] = true;
            }
            let missing: Vec<u64> = (0..self.total)
                .filter(|&iteration| !reported[iteration as usize])
                .collect();
            tracker.record_missing(missing.len() as u64);
            outcomes.extend(missing.into_iter().map(|iteration| TaskOutcome {
                iteration,
                output: worker::output_path(&self.output_folder, iteration),
                result: Err(GrainError::WorkerPanicked(iteration)),
            }));
        }
        tracker.finish();

        outcomes.sort_by_key(|outcome| outcome.iteration);
        BatchReport {
            outcomes,
            elapsed: start.elapsed(),
        }
    }
}

/// Per-task results of a finished batch, ordered by iteration.
#[derive(Debug)]
pub struct BatchReport {
    outcomes: Vec<TaskOutcome>,
    elapsed: Duration,
}

impl BatchReport {
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<TaskOutcome> {
        self.outcomes
    }

    pub fn total(&self) -> u64 {
        self.outcomes.len() as u64
    }

    pub fn succeeded(&self) -> u64 {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count() as u64
    }

    pub fn failed(&self) -> u64 {
        self.total() - self.succeeded()
    }

    /// Outcomes of tasks that did not write their file.
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// `true` if every task wrote its file.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Time spent waiting for the batch to finish.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Grain every frame of `source` once, using the default worker count.
///
/// Shorthand for `BatchScheduler::new(GrainOptions::new(opacity)).run(..)`.
pub fn apply_grain<P: AsRef<Path>>(
    source: &FrameSequence,
    grain: &FrameSequence,
    output_folder: P,
    opacity: f64,
) -> Result<BatchHandle, GrainError> {
    BatchScheduler::new(GrainOptions::new(opacity)).run(source, grain, output_folder)
}

/// Grain a single still image `duration_multiplier` times, producing one
/// output per repeat with a different grain frame each time.
pub fn apply_grain_single<S: AsRef<Path>, P: AsRef<Path>>(
    source: S,
    grain: &FrameSequence,
    output_folder: P,
    options: GrainOptions,
) -> Result<BatchHandle, GrainError> {
    BatchScheduler::new(options).run(&FrameSequence::single(source), grain, output_folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_extracts_text() {
        let literal: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(literal.as_ref()), "boom");

        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");

        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }

    #[test]
    fn zero_workers_rejected_before_pool() {
        let source = FrameSequence::single("a.png");
        let grain = FrameSequence::single("b.png");
        let scheduler = BatchScheduler::new(GrainOptions::new(0.5).with_max_workers(0));
        assert!(matches!(
            scheduler.run(&source, &grain, "out"),
            Err(GrainError::InvalidWorkerCount)
        ));
    }
}
