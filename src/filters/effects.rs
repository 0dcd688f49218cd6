//! Boolean effects: vintage color mix, Sobel edge detection and sharpening.
//!
//! The two neighborhood effects evaluate their 3×3 kernel on interior pixels
//! only. Pixels on the outer row/column are copied through unchanged, so a
//! kernel is never read out of bounds and images narrower or shorter than 3
//! pixels come back untouched.

use crate::core::raster::RasterBuffer;
use crate::filters::tonal::{clamp_channel, luminance};
use image::Rgba;

type Kernel3 = [[f64; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const SHARPEN_KERNEL: Kernel3 = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Rows are output channels (R', G', B'), columns input channels (R, G, B).
const VINTAGE_MATRIX: [[f64; 3]; 3] = [[0.9, 0.5, 0.1], [0.3, 0.8, 0.1], [0.2, 0.3, 0.5]];

/// Warm, faded color mix.
///
/// Every coefficient is non-negative, so only the upper bound needs clamping.
pub fn vintage(raster: RasterBuffer) -> RasterBuffer {
    raster.map_rgb(|[r, g, b]| {
        let (r, g, b) = (r as f64, g as f64, b as f64);
        VINTAGE_MATRIX.map(|[wr, wg, wb]| (wr * r + wg * g + wb * b).min(255.0).round() as u8)
    })
}

#[inline]
fn is_border(x: u32, y: u32, width: u32, height: u32) -> bool {
    x == 0 || y == 0 || x + 1 >= width || y + 1 >= height
}

/// Sobel gradient magnitude of the luma field, written to R, G and B.
///
/// Alpha is preserved. Border pixels keep their input value.
pub fn edge_detection(raster: RasterBuffer) -> RasterBuffer {
    let (width, height) = raster.dimensions();
    if width < 3 || height < 3 {
        return raster;
    }

    let luma: Vec<f64> = raster
        .as_image()
        .pixels()
        .map(|p| luminance(p[0], p[1], p[2]))
        .collect();
    let at = |x: u32, y: u32| luma[(y * width + x) as usize];

    raster.map_from(|x, y| {
        let source = raster.pixel(x, y);
        if is_border(x, y, width, height) {
            return Rgba(source);
        }

        let mut sx = 0.0;
        let mut sy = 0.0;
        for (ky, yy) in (y - 1..=y + 1).enumerate() {
            for (kx, xx) in (x - 1..=x + 1).enumerate() {
                let value = at(xx, yy);
                sx += SOBEL_KERNEL_X[ky][kx] * value;
                sy += SOBEL_KERNEL_Y[ky][kx] * value;
            }
        }

        let edge = (sx * sx + sy * sy).sqrt().min(255.0).round() as u8;
        Rgba([edge, edge, edge, source[3]])
    })
}

/// 4-neighbour sharpening kernel on R, G and B.
///
/// Alpha is preserved. Border pixels keep their input value.
pub fn sharpen(raster: RasterBuffer) -> RasterBuffer {
    let (width, height) = raster.dimensions();
    if width < 3 || height < 3 {
        return raster;
    }

    raster.map_from(|x, y| {
        let source = raster.pixel(x, y);
        if is_border(x, y, width, height) {
            return Rgba(source);
        }

        let mut sums = [0.0f64; 3];
        for (ky, yy) in (y - 1..=y + 1).enumerate() {
            for (kx, xx) in (x - 1..=x + 1).enumerate() {
                let weight = SHARPEN_KERNEL[ky][kx];
                if weight == 0.0 {
                    continue;
                }
                let neighbour = raster.pixel(xx, yy);
                for (sum, channel) in sums.iter_mut().zip(neighbour) {
                    *sum += weight * channel as f64;
                }
            }
        }

        let [r, g, b] = sums.map(clamp_channel);
        Rgba([r, g, b, source[3]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Left half black, right half white.
    fn vertical_edge(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::from_fn(width, height, |x, _| {
            let v = if x < width / 2 { 0 } else { 255 };
            Rgba([v, v, v, 180])
        })
    }

    #[test]
    fn test_vintage_matrix() {
        let raster = RasterBuffer::filled(1, 1, [100, 50, 20, 9]);
        let out = vintage(raster);
        // R' = 90 + 25 + 2 = 117, G' = 30 + 40 + 2 = 72, B' = 20 + 15 + 10 = 45
        assert_eq!(out.pixel(0, 0), [117, 72, 45, 9]);
    }

    #[test]
    fn test_vintage_saturates_at_white() {
        let out = vintage(RasterBuffer::filled(1, 1, [255, 255, 255, 255]));
        // 1.5 * 255 and 1.2 * 255 clip, 1.0 * 255 stays
        assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_edge_detection_flat_image_is_black_inside() {
        let raster = RasterBuffer::filled(5, 5, [90, 90, 90, 255]);
        let out = edge_detection(raster);

        assert_eq!(out.pixel(2, 2), [0, 0, 0, 255]);
        assert_eq!(out.pixel(0, 0), [90, 90, 90, 255]);
        assert_eq!(out.pixel(4, 2), [90, 90, 90, 255]);
    }

    #[test]
    fn test_edge_detection_finds_vertical_edge() {
        let out = edge_detection(vertical_edge(6, 4));

        // Interior columns touching the step see a full-strength gradient
        assert_eq!(out.pixel(2, 1), [255, 255, 255, 180]);
        assert_eq!(out.pixel(3, 2), [255, 255, 255, 180]);
        // Far from the step nothing changes
        assert_eq!(out.pixel(1, 1), [0, 0, 0, 180]);
        assert_eq!(out.pixel(4, 1), [0, 0, 0, 180]);
    }

    #[test]
    fn test_edge_detection_preserves_border() {
        let input = vertical_edge(7, 5);
        let out = edge_detection(input.clone());
        let (w, h) = input.dimensions();

        for x in 0..w {
            assert_eq!(out.pixel(x, 0), input.pixel(x, 0));
            assert_eq!(out.pixel(x, h - 1), input.pixel(x, h - 1));
        }
        for y in 0..h {
            assert_eq!(out.pixel(0, y), input.pixel(0, y));
            assert_eq!(out.pixel(w - 1, y), input.pixel(w - 1, y));
        }
    }

    #[test]
    fn test_small_images_pass_through() {
        let tiny = RasterBuffer::from_fn(2, 9, |x, y| Rgba([x as u8 * 100, y as u8 * 20, 7, 255]));
        assert_eq!(edge_detection(tiny.clone()), tiny);
        assert_eq!(sharpen(tiny.clone()), tiny);
    }

    #[test]
    fn test_sharpen_flat_image_unchanged() {
        let raster = RasterBuffer::filled(4, 4, [33, 66, 99, 120]);
        assert_eq!(sharpen(raster.clone()), raster);
    }

    #[test]
    fn test_sharpen_boosts_isolated_pixel() {
        let raster = RasterBuffer::from_fn(3, 3, |x, y| {
            if (x, y) == (1, 1) {
                Rgba([120, 120, 120, 255])
            } else {
                Rgba([100, 100, 100, 255])
            }
        });
        let out = sharpen(raster);
        // 5 * 120 - 4 * 100 = 200
        assert_eq!(out.pixel(1, 1), [200, 200, 200, 255]);
        assert_eq!(out.pixel(0, 1), [100, 100, 100, 255]);
    }
}
