//! Owned RGBA raster buffers.
//!
//! A [`RasterBuffer`] is the unit every filter stage works on. Outside this
//! crate the only way to obtain one is [`RasterBuffer::decode`], so every
//! instance has `width >= 1`, `height >= 1` and exactly `width * height * 4`
//! bytes of pixel data. Stages inside the crate build new buffers only from
//! buffers of the same dimensions.

use crate::core::error::{DecodeError, EncodeError};
use crate::core::types::{OutputFormat, OutputSpec};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

/// An owned, mutable RGBA8 pixel grid.
///
/// Buffers are moved through the pipeline by value; there is no shared or
/// reference-counted storage, so two operations can never touch the same
/// pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl RasterBuffer {
    /// Decode any format the `image` crate recognizes into an RGBA8 raster.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::new("empty input"));
        }

        let image = image::load_from_memory(bytes)?.into_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::new(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }

        Ok(Self { image })
    }

    /// Serialize the raster into the requested container.
    ///
    /// The returned bytes are complete; on error nothing is returned.
    pub fn encode(&self, spec: OutputSpec) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = self.dimensions();
        let mut bytes = Vec::new();

        let written = match spec.format {
            OutputFormat::Png => PngEncoder::new(&mut bytes).write_image(
                self.image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8(self.image.clone()).into_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, spec.quality.value()).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            OutputFormat::WebP => WebPEncoder::new_lossless(&mut bytes).write_image(
                self.image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
        };

        written.map_err(|e| EncodeError {
            format: spec.format,
            reason: e.to_string(),
        })?;

        Ok(bytes)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.image.width() as usize * self.image.height() as usize
    }

    /// Raw RGBA bytes in row-major order.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The RGBA value at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Borrow the underlying image crate buffer.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take ownership of the underlying image crate buffer.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Wrap an image produced from another raster of the same size.
    pub(crate) fn from_image(image: RgbaImage) -> Self {
        debug_assert!(image.width() > 0 && image.height() > 0);
        Self { image }
    }

    /// Build a raster of the same dimensions from a per-pixel function.
    pub(crate) fn map_from<F>(&self, f: F) -> Self
    where
        F: Fn(u32, u32) -> Rgba<u8>,
    {
        let (width, height) = self.dimensions();
        Self::from_image(RgbaImage::from_fn(width, height, f))
    }

    /// Rewrite the R, G and B channels of every pixel in place; alpha is kept.
    pub(crate) fn map_rgb<F>(mut self, f: F) -> Self
    where
        F: Fn([u8; 3]) -> [u8; 3],
    {
        for pixel in self.image.pixels_mut() {
            let [r, g, b] = f([pixel[0], pixel[1], pixel[2]]);
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
        }
        self
    }

    #[cfg(test)]
    pub(crate) fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    #[cfg(test)]
    pub(crate) fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba<u8>,
    {
        Self::from_image(RgbaImage::from_fn(width, height, f))
    }
}
