//! Tile-local to slide-global coordinate conversion.

use crate::core::traits::TileDetection;
use crate::pipeline::result::DetectionRecord;

/// Converts one tile-local detection to native slide coordinates.
///
/// Tile coordinates are scaled back to native resolution by
/// `mag_to_native` (1.0 when no magnification change was requested), floored
/// to whole pixels, then offset by the tile origin. Flooring keeps a box
/// that started exactly on a tile edge on that edge.
pub(crate) fn remap_detection(
    det: &TileDetection,
    origin_x: i64,
    origin_y: i64,
    mag_to_native: f64,
) -> DetectionRecord {
    let scale = |v: f32, origin: i64| (v as f64 * mag_to_native).floor() as i64 + origin;
    DetectionRecord::new(
        det.label,
        scale(det.bbox[0], origin_x),
        scale(det.bbox[1], origin_y),
        scale(det.bbox[2], origin_x),
        scale(det.bbox[3], origin_y),
        det.confidence,
    )
}
