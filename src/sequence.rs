//! Ordered image sequences.
//!
//! A [`FrameSequence`] is the ordered list of image files the scheduler
//! cycles through, either source frames or grain frames. Order defines the
//! temporal position of each frame, so directory listings are sorted by file
//! name; zero-padded frame dumps (`frame_00001.png`, ...) come out in
//! playback order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GrainError;

/// Extensions picked up by [`FrameSequence::from_directory`] (compared
/// case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp", "gif"];

/// An ordered, read-only list of image file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<PathBuf>,
}

impl FrameSequence {
    /// Wrap an explicit list of paths, keeping their order.
    pub fn new(frames: Vec<PathBuf>) -> Self {
        Self { frames }
    }

    /// A sequence holding one image, e.g. a still that should receive grain
    /// several times through the duration multiplier.
    pub fn single<P: AsRef<Path>>(path: P) -> Self {
        Self {
            frames: vec![path.as_ref().to_path_buf()],
        }
    }

    /// List every image file directly inside `directory`, sorted by file
    /// name.
    ///
    /// Subdirectories and files without a recognised image extension (see
    /// [`IMAGE_EXTENSIONS`]) are skipped. The result may be empty; emptiness
    /// is rejected later, when the sequence is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`GrainError::NotADirectory`] if `directory` is not a
    /// directory, or [`GrainError::IoError`] if it cannot be read.
    pub fn from_directory<P: AsRef<Path>>(directory: P) -> Result<Self, GrainError> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(GrainError::NotADirectory(directory.to_path_buf()));
        }

        let mut frames = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                frames.push(path);
            }
        }
        frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        log::debug!(
            "Found {} image(s) in {}",
            frames.len(),
            directory.display()
        );
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Path at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.frames.get(index).map(PathBuf::as_path)
    }

    /// Path at `index`. Callers index with a [`resolve`](crate::indexer::resolve)d
    /// position, which is always in range.
    pub(crate) fn frame(&self, index: usize) -> &Path {
        &self.frames[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(PathBuf::as_path)
    }
}

impl From<Vec<PathBuf>> for FrameSequence {
    fn from(frames: Vec<PathBuf>) -> Self {
        Self::new(frames)
    }
}

impl FromIterator<PathBuf> for FrameSequence {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}
