//! Tonal adjustments: brightness, contrast and saturation.
//!
//! All three act on R, G and B only, leave alpha alone, and are the identity
//! at intensity 50. Float results are clamped to 0-255 and rounded to the
//! nearest integer, the way a clamped 8-bit store does it.

use crate::core::raster::RasterBuffer;
use crate::filters::config::{MAX_INTENSITY, NEUTRAL_INTENSITY};

/// Rec. 601 luma weights.
pub(crate) const LUMA_R: f64 = 0.299;
pub(crate) const LUMA_G: f64 = 0.587;
pub(crate) const LUMA_B: f64 = 0.114;

/// Clamp to the 8-bit range and round to nearest.
#[inline]
pub(crate) fn clamp_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

#[inline]
pub(crate) fn luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}

/// Shift every channel by `param - 50`.
pub fn brightness(raster: RasterBuffer, param: u8) -> RasterBuffer {
    let delta = param.min(MAX_INTENSITY) as i32 - NEUTRAL_INTENSITY as i32;
    if delta == 0 {
        return raster;
    }

    raster.map_rgb(|rgb| rgb.map(|c| (c as i32 + delta).clamp(0, 255) as u8))
}

/// Multiplier applied around mid-gray for a contrast intensity.
///
/// The intensity maps to a contrast level in -255..=255 (50 → 0), which goes
/// through the usual `259(C+255) / 255(259-C)` curve. Intensity 50 gives
/// exactly 1.0, 0 collapses everything to mid-gray, 100 is a hard threshold.
pub fn contrast_factor(param: u8) -> f64 {
    let level = (param.min(MAX_INTENSITY) as f64 / NEUTRAL_INTENSITY as f64 - 1.0) * 255.0;
    (259.0 * (level + 255.0)) / (255.0 * (259.0 - level))
}

/// Stretch channels away from (or towards) 128.
pub fn contrast(raster: RasterBuffer, param: u8) -> RasterBuffer {
    if param == NEUTRAL_INTENSITY {
        return raster;
    }

    let factor = contrast_factor(param);
    raster.map_rgb(|rgb| rgb.map(|c| clamp_channel(factor * (c as f64 - 128.0) + 128.0)))
}

/// Interpolate each channel between the pixel's luma and its own value.
///
/// The scale is `param / 50`: 0 is grayscale, 50 unchanged, 100 doubles the
/// distance from gray.
pub fn saturation(raster: RasterBuffer, param: u8) -> RasterBuffer {
    let param = param.min(MAX_INTENSITY);
    if param == NEUTRAL_INTENSITY {
        return raster;
    }

    let scale = param as f64 / NEUTRAL_INTENSITY as f64;
    raster.map_rgb(|[r, g, b]| {
        let gray = luminance(r, g, b);
        [r, g, b].map(|c| clamp_channel(gray + scale * (c as f64 - gray)))
    })
}
