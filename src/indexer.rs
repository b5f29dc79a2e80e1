//! Mapping output iterations to (source, grain) frame pairs.
//!
//! Source and grain sequences cycle independently: iteration `i` uses source
//! frame `i mod len(source)` and grain frame `i mod len(grain)`. When the two
//! lengths differ the pairing drifts, and only repeats after
//! `lcm(len(source), len(grain))` iterations.
//!
//! ```
//! use filmgrain::indexer::{FramePair, resolve};
//!
//! let pairs: Vec<FramePair> = (0..6).map(|i| resolve(i, 3, 2).unwrap()).collect();
//! let expected = [(0, 0), (1, 1), (2, 0), (0, 1), (1, 0), (2, 1)];
//! for (pair, (source, grain)) in pairs.iter().zip(expected) {
//!     assert_eq!((pair.source, pair.grain), (source, grain));
//! }
//! ```

use crate::error::GrainError;

/// Source and grain frame indices selected for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramePair {
    /// Index into the source sequence.
    pub source: usize,
    /// Index into the grain sequence.
    pub grain: usize,
}

/// Wrap `iteration` into `0..len`.
///
/// Computed as `((iteration % len) + len) % len`, so negative iterations
/// wrap from the end instead of producing a negative index.
///
/// Evaluated in `i128` so no length or iteration can overflow. `len` must
/// be non-zero; [`resolve`] checks this before calling.
pub(crate) fn cyclic_index(iteration: i64, len: usize) -> usize {
    let iteration = i128::from(iteration);
    let len = len as i128;
    (((iteration % len) + len) % len) as usize
}

/// Select the source and grain frames for `iteration`.
///
/// Total for every iteration, including negative ones.
///
/// # Errors
///
/// Returns [`GrainError::EmptySequence`] if either length is zero.
pub fn resolve(iteration: i64, source_len: usize, grain_len: usize) -> Result<FramePair, GrainError> {
    if source_len == 0 {
        return Err(GrainError::EmptySequence { sequence: "source" });
    }
    if grain_len == 0 {
        return Err(GrainError::EmptySequence { sequence: "grain" });
    }

    Ok(FramePair {
        source: cyclic_index(iteration, source_len),
        grain: cyclic_index(iteration, grain_len),
    })
}

/// Number of output frames: `source_len * duration_multiplier`.
///
/// # Errors
///
/// Returns [`GrainError::IterationOverflow`] if the product does not fit
/// in an `i64`.
pub fn total_iterations(source_len: usize, duration_multiplier: u32) -> Result<i64, GrainError> {
    i64::try_from(source_len)
        .ok()
        .and_then(|len| len.checked_mul(i64::from(duration_multiplier)))
        .ok_or(GrainError::IterationOverflow)
}
