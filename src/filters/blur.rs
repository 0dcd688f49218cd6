//! Separable box blur, the pipeline's final post-process.

use crate::core::raster::RasterBuffer;
use crate::filters::config::MAX_INTENSITY;
use image::{ImageBuffer, Rgba, RgbaImage};

/// Largest radius, reached at intensity 100.
pub const MAX_BLUR_RADIUS: u32 = 20;

/// Kernel radius for a blur intensity: `ceil(intensity / 5)`, so 0 → 0,
/// 1..=5 → 1, ..., 96..=100 → 20.
pub fn blur_radius(intensity: u8) -> u32 {
    (intensity.min(MAX_INTENSITY) as u32).div_ceil(5)
}

/// Box blur of all four channels with a radius driven by `intensity`.
///
/// Intensity 0 returns the input untouched. Edges are handled by clamping
/// samples to the nearest pixel inside the image. Both passes accumulate in
/// `f32` and round once at the end, so flat regions keep their exact value.
pub fn box_blur(raster: RasterBuffer, intensity: u8) -> RasterBuffer {
    let radius = blur_radius(intensity);
    if radius == 0 {
        return raster;
    }

    let size = (2 * radius + 1) as usize;
    let kernel = vec![1.0f32 / size as f32; size];

    let (width, height) = raster.dimensions();
    let wide: ImageBuffer<Rgba<f32>, Vec<f32>> = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba(raster.pixel(x, y).map(f32::from))
    });

    let blurred = imageproc::filter::separable_filter(&wide, &kernel, &kernel);
    RasterBuffer::from_image(RgbaImage::from_fn(width, height, |x, y| {
        Rgba(blurred.get_pixel(x, y).0.map(|c| c.round().clamp(0.0, 255.0) as u8))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_is_monotonic() {
        assert_eq!(blur_radius(0), 0);
        assert_eq!(blur_radius(1), 1);
        assert_eq!(blur_radius(5), 1);
        assert_eq!(blur_radius(6), 2);
        assert_eq!(blur_radius(100), MAX_BLUR_RADIUS);
        assert_eq!(blur_radius(255), MAX_BLUR_RADIUS);

        for intensity in 1..=100u8 {
            assert!(blur_radius(intensity) >= blur_radius(intensity - 1));
        }
    }

    #[test]
    fn test_zero_is_exact_noop() {
        let raster = RasterBuffer::from_fn(5, 5, |x, y| Rgba([(x * 50) as u8, (y * 50) as u8, 3, 255]));
        assert_eq!(box_blur(raster.clone(), 0), raster);
    }

    #[test]
    fn test_blur_softens_step_edge() {
        let raster = RasterBuffer::from_fn(9, 3, |x, _| {
            let v = if x < 4 { 0 } else { 255 };
            Rgba([v, v, v, 255])
        });
        let out = box_blur(raster, 5);
        assert_eq!(out.dimensions(), (9, 3));

        // Pixels next to the step land strictly between the two levels
        let left = out.pixel(3, 1)[0];
        let right = out.pixel(4, 1)[0];
        assert!(left > 0 && left < 255);
        assert!(right > 0 && right < 255);
        assert!(left < right);

        // Far from the step keeps the original level
        assert_eq!(out.pixel(0, 1), [0, 0, 0, 255]);
        assert_eq!(out.pixel(8, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_flat_image_is_unchanged_at_every_intensity() {
        for value in [1u8, 77, 128, 200, 255] {
            let raster = RasterBuffer::filled(45, 45, [value; 4]);
            for intensity in 1..=100u8 {
                let out = box_blur(raster.clone(), intensity);
                assert_eq!(out, raster, "value {value} intensity {intensity}");
            }
        }
    }
}
