//! # filmgrain
//!
//! Composite film-grain textures over still frames (usually decoded video
//! frames) in bounded parallel batches.
//!
//! Given an ordered sequence of source frames and an ordered sequence of
//! grain plates, `filmgrain` writes one overlay-blended JPEG per output
//! iteration into an output folder, ready to be re-encoded by an external
//! tool such as FFmpeg.
//!
//! ## Quick Start
//!
//! ### Grain a folder of frames
//!
//! ```no_run
//! use filmgrain::{BatchScheduler, FrameSequence, GrainError, GrainOptions};
//!
//! let source = FrameSequence::from_directory("frames")?;
//! let grain = FrameSequence::from_directory("grain_plates")?;
//!
//! let report = BatchScheduler::new(GrainOptions::new(0.3))
//!     .run(&source, &grain, "out")?
//!     .wait();
//! println!("{} written, {} failed", report.succeeded(), report.failed());
//! # Ok::<(), GrainError>(())
//! ```
//!
//! ### Animate grain over a single still
//!
//! ```no_run
//! use filmgrain::{FrameSequence, GrainError, GrainOptions, apply_grain_single};
//!
//! let grain = FrameSequence::from_directory("grain_plates")?;
//! let options = GrainOptions::new(0.4).with_duration_multiplier(48);
//! apply_grain_single("poster.png", &grain, "out", options)?.wait();
//! # Ok::<(), GrainError>(())
//! ```
//!
//! ## How frames are paired
//!
//! The batch has `len(source) * duration_multiplier` iterations. Iteration
//! `i` overlays grain frame `i mod len(grain)` onto source frame
//! `i mod len(source)` and writes `<out>/<i>.jpg`. The two sequences cycle
//! independently, so with 3 source frames and 2 grain frames the pairs are
//! `(0,0) (1,1) (2,0) (0,1) (1,0) (2,1)`. See [`indexer`].
//!
//! ## Concurrency
//!
//! Each batch gets its own pool of `max_workers` threads. [`BatchScheduler::run`]
//! returns once all tasks are submitted; the returned [`BatchHandle`] can be
//! waited on for a [`BatchReport`] or dropped to let the batch finish in the
//! background. A failing frame is logged and recorded, never fatal to the
//! batch.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://crates.io/crates/log) facade.
//! Install any `log` backend to see per-task failures.

pub mod blend;
pub mod codec;
pub mod configuration;
pub mod error;
pub mod indexer;
pub mod progress;
pub mod scheduler;
pub mod sequence;
pub mod worker;

pub use blend::{Blend, OverlayBlend};
pub use codec::{FrameCodec, JpegCodec};
pub use configuration::{
    DEFAULT_DURATION_MULTIPLIER, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WORKERS, GrainOptions,
};
pub use error::GrainError;
pub use indexer::FramePair;
pub use progress::{ProgressCallback, ProgressInfo};
pub use scheduler::{BatchHandle, BatchReport, BatchScheduler, apply_grain, apply_grain_single};
pub use sequence::FrameSequence;
pub use worker::{CompositeTask, TaskOutcome};
