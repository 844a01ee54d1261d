//! Tile extraction and normalisation.
//!
//! Every tile handed to the detector is a square RGB image of exactly the
//! configured tile size. Sources may return a smaller raster at the right
//! and bottom edges; the fetcher pads those with the fill colour so every
//! tile looks the same to the detector. When a coarse mask is present, the
//! pixels outside the region of interest are blanked with the same fill.

use image::{imageops, Rgb, RgbImage};

use crate::core::errors::WsiError;
use crate::core::traits::TileSource;
use crate::pipeline::grid::TileSpec;
use crate::pipeline::mask::CoarseMask;

/// Per-run fetch settings, extracted once from the configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FetchParams {
    /// Side of the tile handed to the detector, in detector pixels.
    pub tile_size: u32,
    /// Native pixels covered by one tile.
    pub native_tile_size: i64,
    pub fill: [u8; 3],
    pub magnification: Option<f32>,
    pub frame: Option<usize>,
}

/// Reads one tile from `source` and normalises it to a square RGB image.
pub(crate) fn fetch_tile(
    source: &dyn TileSource,
    spec: &TileSpec,
    mask: Option<&CoarseMask>,
    params: &FetchParams,
) -> Result<RgbImage, WsiError> {
    let region = source.read_region(
        spec.x,
        spec.y,
        spec.x + params.native_tile_size,
        spec.y + params.native_tile_size,
        params.magnification,
        params.frame,
    )?;

    // Grayscale sources fan out to three identical channels here.
    let rgb = region.to_rgb8();
    if rgb.width() > params.tile_size || rgb.height() > params.tile_size {
        return Err(WsiError::source_contract(format!(
            "region at ({}, {}) returned {}x{} pixels, expected at most {}x{}",
            spec.x,
            spec.y,
            rgb.width(),
            rgb.height(),
            params.tile_size,
            params.tile_size
        )));
    }

    let fill = Rgb(params.fill);
    let mut tile = if rgb.width() == params.tile_size && rgb.height() == params.tile_size {
        rgb
    } else {
        // Edge tile. Content stays anchored at the top-left corner.
        let mut canvas = RgbImage::from_pixel(params.tile_size, params.tile_size, fill);
        imageops::replace(&mut canvas, &rgb, 0, 0);
        canvas
    };

    if let (Some(mask), Some(window)) = (mask, spec.mask_window) {
        // Fully covered tiles skip the per-pixel pass.
        if spec.coverage != Some(1.0) {
            let stencil = mask.window_image(window, params.tile_size);
            for (x, y, pixel) in tile.enumerate_pixels_mut() {
                if stencil.get_pixel(x, y).0[0] == 0 {
                    *pixel = fill;
                }
            }
        }
    }

    Ok(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::SourceMetadata;
    use image::DynamicImage;
    use ndarray::Array2;

    /// Constant-colour source that crops reads to its bounds, the way a
    /// slide reader does at the right and bottom edges.
    struct FlatSource {
        width: i64,
        height: i64,
        value: u8,
    }

    impl TileSource for FlatSource {
        fn metadata(&self) -> Result<SourceMetadata, WsiError> {
            Ok(SourceMetadata {
                width: self.width,
                height: self.height,
                magnification: None,
            })
        }

        fn read_region(
            &self,
            left: i64,
            top: i64,
            right: i64,
            bottom: i64,
            _magnification: Option<f32>,
            _frame: Option<usize>,
        ) -> Result<DynamicImage, WsiError> {
            let w = (right.min(self.width) - left) as u32;
            let h = (bottom.min(self.height) - top) as u32;
            Ok(DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
                w, h, image::Luma([self.value]),
            )))
        }
    }

    fn spec_at(x: i64, y: i64) -> TileSpec {
        TileSpec {
            x,
            y,
            mask_window: None,
            coverage: None,
        }
    }

    fn params(tile_size: u32) -> FetchParams {
        FetchParams {
            tile_size,
            native_tile_size: tile_size as i64,
            fill: [255, 255, 255],
            magnification: None,
            frame: None,
        }
    }

    #[test]
    fn grayscale_replicates_into_all_channels() {
        let source = FlatSource {
            width: 100,
            height: 100,
            value: 40,
        };
        let tile = fetch_tile(&source, &spec_at(0, 0), None, &params(100)).unwrap();
        assert_eq!(tile.get_pixel(50, 50), &Rgb([40, 40, 40]));
    }

    #[test]
    fn edge_tile_is_padded_with_fill() {
        let source = FlatSource {
            width: 70,
            height: 100,
            value: 10,
        };
        let tile = fetch_tile(&source, &spec_at(0, 0), None, &params(100)).unwrap();
        assert_eq!(tile.dimensions(), (100, 100));
        assert_eq!(tile.get_pixel(69, 50), &Rgb([10, 10, 10]));
        assert_eq!(tile.get_pixel(70, 50), &Rgb([255, 255, 255]));
    }

    #[test]
    fn oversized_region_is_a_contract_error() {
        struct Oversized;
        impl TileSource for Oversized {
            fn metadata(&self) -> Result<SourceMetadata, WsiError> {
                Ok(SourceMetadata {
                    width: 100,
                    height: 100,
                    magnification: None,
                })
            }
            fn read_region(
                &self,
                _: i64,
                _: i64,
                _: i64,
                _: i64,
                _: Option<f32>,
                _: Option<usize>,
            ) -> Result<DynamicImage, WsiError> {
                Ok(DynamicImage::ImageRgb8(RgbImage::new(150, 150)))
            }
        }
        let err = fetch_tile(&Oversized, &spec_at(0, 0), None, &params(100)).unwrap_err();
        assert!(matches!(err, WsiError::SourceRead { .. }));
    }

    #[test]
    fn partially_covered_tile_is_blanked_outside_the_mask() {
        // Left half of the mask is foreground; the tile straddles the edge.
        let mut raster = Array2::<u8>::zeros((10, 10));
        raster.slice_mut(ndarray::s![.., ..5]).fill(255);
        let mask = CoarseMask::new(raster).unwrap();

        let source = FlatSource {
            width: 100,
            height: 100,
            value: 10,
        };
        let spec = TileSpec {
            x: 25,
            y: 0,
            mask_window: Some(crate::pipeline::mask::MaskWindow { x: 2, y: 0, side: 5 }),
            coverage: Some(0.6),
        };
        let tile = fetch_tile(&source, &spec, Some(&mask), &params(50)).unwrap();
        // Mask cells 2..5 are foreground, 5..7 background; each cell spans
        // 10 tile pixels.
        assert_eq!(tile.get_pixel(0, 25), &Rgb([10, 10, 10]));
        assert_eq!(tile.get_pixel(29, 25), &Rgb([10, 10, 10]));
        assert_eq!(tile.get_pixel(30, 25), &Rgb([255, 255, 255]));
        assert_eq!(tile.get_pixel(49, 25), &Rgb([255, 255, 255]));
    }

    #[test]
    fn fully_covered_tile_is_untouched() {
        let mask = CoarseMask::new(Array2::<u8>::from_elem((10, 10), 255)).unwrap();
        let source = FlatSource {
            width: 100,
            height: 100,
            value: 10,
        };
        let spec = TileSpec {
            x: 0,
            y: 0,
            mask_window: Some(crate::pipeline::mask::MaskWindow { x: 0, y: 0, side: 5 }),
            coverage: Some(1.0),
        };
        let tile = fetch_tile(&source, &spec, Some(&mask), &params(50)).unwrap();
        assert!(tile.pixels().all(|p| *p == Rgb([10, 10, 10])));
    }
}
