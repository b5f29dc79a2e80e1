//! The per-iteration unit of work.
//!
//! A [`CompositeTask`] decodes one source frame and one grain frame,
//! overlays them, and writes `<output_folder>/<iteration>.jpg`. Failures
//! never escape [`execute`]: they are logged and returned inside the
//! [`TaskOutcome`] so one bad frame cannot abort the batch.

use std::path::{Path, PathBuf};

use crate::blend::Blend;
use crate::codec::FrameCodec;
use crate::error::GrainError;

/// Everything one worker needs to produce one output frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTask {
    /// Output index; also the output file stem.
    pub iteration: u64,
    /// Frame receiving the grain.
    pub source: PathBuf,
    /// Grain texture laid over the source.
    pub grain: PathBuf,
    /// Directory the composite is written into. Assumed to exist.
    pub output_folder: PathBuf,
    /// Blend opacity.
    pub opacity: f64,
}

impl CompositeTask {
    /// `<output_folder>/<iteration>.jpg`
    pub fn output_path(&self) -> PathBuf {
        output_path(&self.output_folder, self.iteration)
    }
}

/// Path of the composite written for `iteration`.
pub fn output_path(output_folder: &Path, iteration: u64) -> PathBuf {
    output_folder.join(format!("{iteration}.jpg"))
}

/// Result of running one [`CompositeTask`].
#[derive(Debug)]
pub struct TaskOutcome {
    /// Iteration of the task.
    pub iteration: u64,
    /// Where the composite was (or would have been) written.
    pub output: PathBuf,
    /// `Ok(())` if the file was written.
    pub result: Result<(), GrainError>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run one task synchronously: decode both inputs, blend, encode.
///
/// Any error is logged at `error` level and captured in the outcome.
pub fn execute(task: &CompositeTask, codec: &dyn FrameCodec, blend: &dyn Blend) -> TaskOutcome {
    let output = task.output_path();
    let result = composite(task, &output, codec, blend);

    match &result {
        Ok(()) => log::debug!(
            "Iteration {}: {} + {} -> {}",
            task.iteration,
            task.source.display(),
            task.grain.display(),
            output.display()
        ),
        Err(error) => log::error!("Iteration {} failed: {error}", task.iteration),
    }

    TaskOutcome {
        iteration: task.iteration,
        output,
        result,
    }
}

fn composite(
    task: &CompositeTask,
    output: &Path,
    codec: &dyn FrameCodec,
    blend: &dyn Blend,
) -> Result<(), GrainError> {
    let source = codec.decode(&task.source)?;
    let grain = codec.decode(&task.grain)?;
    let composite = blend.overlay(&source, &grain, task.opacity)?;
    codec.encode(&composite, output)
}
