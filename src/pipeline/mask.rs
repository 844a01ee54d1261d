//! Coarse region-of-interest mask.

use image::GrayImage;
use image::imageops::{self, FilterType};
use ndarray::Array2;

use crate::core::errors::WsiError;

/// A window into the mask raster, in mask-space coordinates.
///
/// Windows are planned at the tile's nominal footprint and may extend past
/// the raster's right/bottom bounds; consumers clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskWindow {
    /// Left edge in mask cells.
    pub x: i64,
    /// Top edge in mask cells.
    pub y: i64,
    /// Square side length in mask cells, at least 1.
    pub side: i64,
}

/// A low-resolution binary raster marking the slide regions worth analyzing.
///
/// Nonzero cells are inside the region of interest. The mask is immutable
/// input: the pipeline only ever reads it, so it can be shared freely across
/// concurrent tile workers.
#[derive(Debug, Clone)]
pub struct CoarseMask {
    raster: Array2<u8>,
}

impl CoarseMask {
    /// Wraps a mask raster. Fails on empty dimensions.
    pub fn new(raster: Array2<u8>) -> Result<Self, WsiError> {
        let (rows, cols) = raster.dim();
        if rows == 0 || cols == 0 {
            return Err(WsiError::config_detailed(
                "coarse mask",
                format!("raster must be non-empty, got {rows}x{cols}"),
            ));
        }
        Ok(Self { raster })
    }

    /// Mask width in cells.
    pub fn width(&self) -> usize {
        self.raster.dim().1
    }

    /// Mask height in cells.
    pub fn height(&self) -> usize {
        self.raster.dim().0
    }

    /// Mask cells per source pixel, derived from the height ratio.
    ///
    /// The width-derived ratio must agree within 2% relative tolerance;
    /// a mismatch means the mask was built for a different slide.
    pub(crate) fn scale_for(&self, source_width: i64, source_height: i64) -> Result<f64, WsiError> {
        let scale_y = self.height() as f64 / source_height as f64;
        let scale_x = self.width() as f64 / source_width as f64;
        let relative = (scale_x - scale_y).abs() / scale_y.max(f64::MIN_POSITIVE);
        if relative > 0.02 {
            return Err(WsiError::config_detailed(
                "coarse mask",
                format!(
                    "mask aspect does not match the slide: height scale {scale_y:.6}, width scale {scale_x:.6}"
                ),
            ));
        }
        Ok(scale_y)
    }

    /// Fraction of the window's cells that are inside the region of interest.
    ///
    /// The window is clipped at the raster bounds and the denominator is the
    /// clipped area, so a fully covered border tile still reports 1.0. An
    /// entirely out-of-bounds window reports 0.0.
    pub(crate) fn coverage(&self, window: MaskWindow) -> f64 {
        let x0 = window.x.max(0) as usize;
        let y0 = window.y.max(0) as usize;
        let x1 = (window.x + window.side).clamp(0, self.width() as i64) as usize;
        let y1 = (window.y + window.side).clamp(0, self.height() as i64) as usize;
        if x0 >= x1 || y0 >= y1 {
            return 0.0;
        }

        let block = self.raster.slice(ndarray::s![y0..y1, x0..x1]);
        let nonzero = block.iter().filter(|&&v| v != 0).count();
        nonzero as f64 / block.len() as f64
    }

    /// Renders the window as a `side x side` grayscale image, upsampled with
    /// nearest-neighbour interpolation. Cells outside the raster are zero,
    /// matching the fill applied to padded tile pixels.
    pub(crate) fn window_image(&self, window: MaskWindow, side: u32) -> GrayImage {
        let nominal = window.side.max(1) as u32;
        let mut block = GrayImage::new(nominal, nominal);
        for (py, row) in (window.y..window.y + window.side).enumerate() {
            if row < 0 || row >= self.height() as i64 {
                continue;
            }
            for (px, col) in (window.x..window.x + window.side).enumerate() {
                if col < 0 || col >= self.width() as i64 {
                    continue;
                }
                block.put_pixel(
                    px as u32,
                    py as u32,
                    image::Luma([self.raster[[row as usize, col as usize]]]),
                );
            }
        }
        imageops::resize(&block, side, side, FilterType::Nearest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_mask() -> CoarseMask {
        // 100x100 mask, left half (columns 0..50) in the region of interest.
        let mut raster = Array2::<u8>::zeros((100, 100));
        raster.slice_mut(ndarray::s![.., ..50]).fill(255);
        CoarseMask::new(raster).unwrap()
    }

    #[test]
    fn rejects_empty_raster() {
        assert!(CoarseMask::new(Array2::<u8>::zeros((0, 10))).is_err());
    }

    #[test]
    fn scale_requires_matching_aspect() {
        let mask = half_mask();
        let scale = mask.scale_for(1000, 1000).unwrap();
        assert!((scale - 0.1).abs() < 1e-12);
        // Slide twice as wide as the mask expects.
        assert!(mask.scale_for(2000, 1000).is_err());
    }

    #[test]
    fn coverage_of_fully_inside_windows() {
        let mask = half_mask();
        let left = MaskWindow { x: 0, y: 0, side: 50 };
        let right = MaskWindow { x: 50, y: 0, side: 50 };
        assert_eq!(mask.coverage(left), 1.0);
        assert_eq!(mask.coverage(right), 0.0);
    }

    #[test]
    fn coverage_straddling_the_boundary() {
        let mask = half_mask();
        let window = MaskWindow { x: 25, y: 0, side: 50 };
        assert!((mask.coverage(window) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn border_window_uses_clipped_denominator() {
        let mask = half_mask();
        // Window half off the bottom of the raster, entirely in the covered
        // left half: the clipped block is fully nonzero, so coverage is 1.0.
        let window = MaskWindow { x: 0, y: 75, side: 50 };
        assert_eq!(mask.coverage(window), 1.0);
    }

    #[test]
    fn out_of_bounds_window_has_zero_coverage() {
        let mask = half_mask();
        let window = MaskWindow { x: 200, y: 200, side: 50 };
        assert_eq!(mask.coverage(window), 0.0);
    }

    #[test]
    fn window_image_upsamples_with_hard_edges() {
        let mask = half_mask();
        let window = MaskWindow { x: 25, y: 0, side: 50 };
        let img = mask.window_image(window, 500);
        assert_eq!(img.dimensions(), (500, 500));
        // Left half of the window is covered, right half is not; nearest
        // neighbour keeps the edge sharp.
        assert_eq!(img.get_pixel(10, 10).0[0], 255);
        assert_eq!(img.get_pixel(490, 10).0[0], 0);
    }

    #[test]
    fn window_image_zero_fills_outside_the_raster() {
        let mask = half_mask();
        let window = MaskWindow { x: 0, y: 75, side: 50 };
        let img = mask.window_image(window, 100);
        // Top half maps to covered rows, bottom half is past the raster edge.
        assert_eq!(img.get_pixel(10, 10).0[0], 255);
        assert_eq!(img.get_pixel(10, 90).0[0], 0);
    }
}
