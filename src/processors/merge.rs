//! Cross-tile detection merging.
//!
//! Tiling with overlap means the same physical object is detected
//! independently by several tiles. Two passes collapse the duplicates once
//! all detections are in a shared coordinate space:
//!
//! 1. [`non_max_suppression`] — greedy, class-agnostic IoU suppression over
//!    the whole detection set.
//! 2. [`remove_contained_boxes`] — drops smaller boxes mostly enclosed by a
//!    larger surviving box. A nested fragment can have low IoU against its
//!    container (the large area dominates the union) while still being a
//!    redundant sub-detection, so this pass tests intersection against the
//!    smaller box's own area instead.
//!
//! Both passes are O(n²); detection counts per slide sit in the low
//! thousands, so no spatial index is warranted.

use std::cmp::Ordering;

use crate::pipeline::result::DetectionRecord;
use crate::processors::geometry::BoundingBox;

/// Greedy non-max suppression across the complete detection set.
///
/// Detections are visited in order of descending confidence (the sort is
/// stable, so equal-confidence ties keep their original relative order and
/// the earlier detection wins). A candidate is discarded when its IoU with
/// any already-kept detection is strictly greater than `iou_threshold`.
///
/// Not associative: merging partial sets and then merging the merges does
/// not equal one merge over the union. Run exactly once, over everything.
pub fn non_max_suppression(
    detections: Vec<DetectionRecord>,
    iou_threshold: f32,
) -> Vec<DetectionRecord> {
    let mut ordered = detections;
    ordered.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<DetectionRecord> = Vec::with_capacity(ordered.len());
    let mut kept_polys: Vec<BoundingBox> = Vec::with_capacity(ordered.len());

    for det in ordered {
        let poly = det.polygon();
        let suppressed = kept_polys.iter().any(|k| poly.iou(k) > iou_threshold);
        if !suppressed {
            kept_polys.push(poly);
            kept.push(det);
        }
    }

    kept
}

/// Drops boxes mostly contained inside a larger surviving box.
///
/// For each candidate, containment is the intersection with a strictly
/// larger kept box divided by the candidate's own area; the candidate is
/// dropped when that fraction strictly exceeds `contained_threshold`.
/// Processing runs in descending area order and removal is greedy, so a
/// dropped box never participates in later comparisons and the largest box
/// of any nested pair is never removed by this pass.
pub fn remove_contained_boxes(
    detections: Vec<DetectionRecord>,
    contained_threshold: f32,
) -> Vec<DetectionRecord> {
    let mut ordered = detections;
    ordered.sort_by(|a, b| b.area().cmp(&a.area()));

    let mut kept: Vec<DetectionRecord> = Vec::with_capacity(ordered.len());
    let mut kept_polys: Vec<(BoundingBox, i64)> = Vec::with_capacity(ordered.len());

    for det in ordered {
        let poly = det.polygon();
        let own_area = poly.area();
        let contained = own_area > 0.0
            && kept_polys.iter().any(|(big, big_area)| {
                *big_area > det.area() && poly.intersection_area(big) / own_area > contained_threshold
            });
        if !contained {
            kept_polys.push((poly, det.area()));
            kept.push(det);
        }
    }

    kept
}
