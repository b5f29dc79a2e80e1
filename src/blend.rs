//! Overlay blending of a grain texture onto a frame.
//!
//! [`OverlayBlend`] implements the classic "overlay" blend mode per colour
//! channel, normalised to `0.0..=1.0`:
//!
//! ```text
//! overlay(a, b) = 2ab                    if a < 0.5
//!               = 1 - 2(1 - a)(1 - b)    otherwise
//! out           = a + (overlay(a, b) - a) * opacity
//! ```
//!
//! where `a` is the base (source) channel and `b` the grain channel. A
//! mid-grey grain pixel leaves the base unchanged, which is why film-grain
//! plates are usually authored around 50% grey.

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::GrainError;

/// Combines a base frame with a grain frame at a given opacity.
///
/// Implementations are shared across worker threads.
pub trait Blend: Send + Sync {
    /// Blend `grain` over `base`.
    ///
    /// # Errors
    ///
    /// Returns [`GrainError::DimensionMismatch`] when the two images have
    /// different dimensions.
    fn overlay(
        &self,
        base: &DynamicImage,
        grain: &DynamicImage,
        opacity: f64,
    ) -> Result<DynamicImage, GrainError>;
}

/// The default overlay blend. Keeps the base image's alpha.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayBlend;

impl Blend for OverlayBlend {
    fn overlay(
        &self,
        base: &DynamicImage,
        grain: &DynamicImage,
        opacity: f64,
    ) -> Result<DynamicImage, GrainError> {
        let dimensions = (base.width(), base.height());
        let grain_dimensions = (grain.width(), grain.height());
        if dimensions != grain_dimensions {
            return Err(GrainError::DimensionMismatch {
                base: dimensions,
                grain: grain_dimensions,
            });
        }

        let opacity = opacity.clamp(0.0, 1.0) as f32;
        let base = base.to_rgba8();
        let grain = grain.to_rgba8();

        let output = RgbaImage::from_fn(dimensions.0, dimensions.1, |x, y| {
            let Rgba([br, bg, bb, ba]) = *base.get_pixel(x, y);
            let Rgba([gr, gg, gb, _]) = *grain.get_pixel(x, y);
            Rgba([
                blend_channel(br, gr, opacity),
                blend_channel(bg, gg, opacity),
                blend_channel(bb, gb, opacity),
                ba,
            ])
        });

        Ok(DynamicImage::ImageRgba8(output))
    }
}

fn blend_channel(base: u8, grain: u8, opacity: f32) -> u8 {
    let a = f32::from(base) / 255.0;
    let b = f32::from(grain) / 255.0;
    let overlay = if a < 0.5 {
        2.0 * a * b
    } else {
        1.0 - 2.0 * (1.0 - a) * (1.0 - b)
    };
    let mixed = a + (overlay - a) * opacity;
    (mixed.clamp(0.0, 1.0) * 255.0).round() as u8
}
