//! Tile grid planning.
//!
//! The planner enumerates tile origins covering the slide in row-major order
//! (`y` outer, `x` inner), which keeps fixtures reproducible. With a coarse
//! mask, each candidate origin is mapped into mask space and kept only when
//! its coverage is strictly above the mask threshold; rejected tiles are
//! dropped silently.

use crate::core::errors::WsiError;
use crate::core::validation::validate_positive;
use crate::pipeline::mask::{CoarseMask, MaskWindow};

/// One planned tile. Created by the planner, consumed once by the fetcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSpec {
    /// Tile origin in native source pixels.
    pub x: i64,
    /// Tile origin in native source pixels.
    pub y: i64,
    /// The tile's footprint in mask space, when planned with a mask.
    pub mask_window: Option<MaskWindow>,
    /// Fraction of the mask window inside the region of interest.
    pub coverage: Option<f64>,
}

/// Lazy row-major iterator over the tiles of one inference run.
pub struct GridPlan<'a> {
    width: i64,
    height: i64,
    native_stride: i64,
    mask: Option<MaskState<'a>>,
    x: i64,
    y: i64,
}

struct MaskState<'a> {
    mask: &'a CoarseMask,
    scale: f64,
    window_side: i64,
    threshold: f64,
}

impl<'a> GridPlan<'a> {
    /// Plans the grid for a slide of `width x height` native pixels.
    ///
    /// `native_tile_size` and `native_stride` are the tile footprint and
    /// stride at native resolution (already scaled for magnification by the
    /// caller). When `mask` is given, its scale is validated against the
    /// slide dimensions and tiles at or below `mask_threshold` coverage are
    /// skipped.
    pub fn new(
        width: i64,
        height: i64,
        native_tile_size: i64,
        native_stride: i64,
        mask: Option<&'a CoarseMask>,
        mask_threshold: f64,
    ) -> Result<Self, WsiError> {
        validate_positive(native_tile_size, "tile_size")?;
        validate_positive(native_stride, "stride")?;
        validate_positive(width, "source width")?;
        validate_positive(height, "source height")?;

        let mask = match mask {
            Some(mask) => {
                let scale = mask.scale_for(width, height)?;
                Some(MaskState {
                    mask,
                    scale,
                    window_side: ((native_tile_size as f64 * scale) as i64).max(1),
                    threshold: mask_threshold,
                })
            }
            None => None,
        };

        Ok(Self {
            width,
            height,
            native_stride,
            mask,
            x: 0,
            y: 0,
        })
    }
}

impl Iterator for GridPlan<'_> {
    type Item = TileSpec;

    fn next(&mut self) -> Option<TileSpec> {
        loop {
            if self.y >= self.height {
                return None;
            }
            let (x, y) = (self.x, self.y);

            self.x += self.native_stride;
            if self.x >= self.width {
                self.x = 0;
                self.y += self.native_stride;
            }

            match &self.mask {
                None => {
                    return Some(TileSpec {
                        x,
                        y,
                        mask_window: None,
                        coverage: None,
                    });
                }
                Some(state) => {
                    let window = MaskWindow {
                        x: (x as f64 * state.scale) as i64,
                        y: (y as f64 * state.scale) as i64,
                        side: state.window_side,
                    };
                    let coverage = state.mask.coverage(window);
                    if coverage > state.threshold {
                        return Some(TileSpec {
                            x,
                            y,
                            mask_window: Some(window),
                            coverage: Some(coverage),
                        });
                    }
                }
            }
        }
    }
}
