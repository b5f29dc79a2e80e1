//! Reading frames from and writing composites to disk.
//!
//! The scheduler only talks to the [`FrameCodec`] trait, so tests and
//! callers can swap the on-disk format. [`JpegCodec`] is the default: it
//! reads anything the `image` crate understands and writes baseline JPEG.

use std::fs;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};

use crate::configuration::DEFAULT_JPEG_QUALITY;
use crate::error::GrainError;

/// Whole-image decode/encode used by each composite task.
///
/// Implementations are shared across worker threads.
pub trait FrameCodec: Send + Sync {
    /// Read and decode the image at `path`.
    fn decode(&self, path: &Path) -> Result<DynamicImage, GrainError>;

    /// Encode `image` and write it to `path`, replacing any existing file.
    ///
    /// On error nothing is written and an existing file at `path` is left as is.
    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), GrainError>;
}

/// Default codec: any input format, JPEG output.
#[derive(Debug, Clone, Copy)]
pub struct JpegCodec {
    quality: u8,
}

impl JpegCodec {
    /// Create a codec writing JPEG at `quality` (1–100).
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameCodec for JpegCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, GrainError> {
        let decode_error = |reason: String| GrainError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        ImageReader::open(path)
            .map_err(|error| decode_error(error.to_string()))?
            .with_guessed_format()
            .map_err(|error| decode_error(error.to_string()))?
            .decode()
            .map_err(|error| decode_error(error.to_string()))
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), GrainError> {
        let encode_error = |reason: String| GrainError::Encode {
            path: path.to_path_buf(),
            reason,
        };

        // JPEG has no alpha channel.
        let rgb = image.to_rgb8();
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.quality)
            .encode_image(&rgb)
            .map_err(|error| encode_error(error.to_string()))?;
        fs::write(path, &buffer).map_err(|error| encode_error(error.to_string()))
    }
}
