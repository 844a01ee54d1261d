//! Final detection records and the result table.

use serde::{Deserialize, Serialize};

use crate::processors::geometry::BoundingBox;

/// One surviving detection in source-image coordinates.
///
/// Invariant: `x2 >= x1` and `y2 >= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Integer class id assigned by the detector.
    pub label: u32,
    /// Left edge, in source pixels.
    pub x1: i64,
    /// Top edge, in source pixels.
    pub y1: i64,
    /// Right edge, in source pixels.
    pub x2: i64,
    /// Bottom edge, in source pixels.
    pub y2: i64,
    /// Confidence score in `[0, 1]`.
    pub confidence: f32,
}

impl DetectionRecord {
    /// Creates a new record.
    pub fn new(label: u32, x1: i64, y1: i64, x2: i64, y2: i64, confidence: f32) -> Self {
        Self {
            label,
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    /// Box area in square pixels.
    pub fn area(&self) -> i64 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    /// The axis-aligned quadrilateral through the box corners.
    pub fn polygon(&self) -> BoundingBox {
        BoundingBox::from_corners(
            self.x1 as f32,
            self.y1 as f32,
            self.x2 as f32,
            self.y2 as f32,
        )
    }
}

/// The flat tabular output of one inference run.
///
/// Record order is not significant to callers; the table sorts by confidence
/// descending (ties broken by label, then coordinates) purely so fixtures are
/// reproducible.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionTable {
    /// The surviving detections.
    pub records: Vec<DetectionRecord>,
}

impl DetectionTable {
    /// Assembles a table from merged detections, in deterministic order.
    pub fn from_detections(mut records: Vec<DetectionRecord>) -> Self {
        records.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| (a.x1, a.y1, a.x2, a.y2).cmp(&(b.x1, b.y1, b.x2, b.y2)))
        });
        Self { records }
    }

    /// Number of detections in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no detections survived.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, DetectionRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DetectionTable {
    type Item = &'a DetectionRecord;
    type IntoIter = std::slice::Iter<'a, DetectionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_area_and_polygon() {
        let record = DetectionRecord::new(0, 100, 200, 110, 230, 0.9);
        assert_eq!(record.area(), 10 * 30);
        let poly = record.polygon();
        assert_eq!(poly.x_min(), 100.0);
        assert_eq!(poly.y_max(), 230.0);
    }

    #[test]
    fn table_orders_by_confidence_descending() {
        let table = DetectionTable::from_detections(vec![
            DetectionRecord::new(1, 0, 0, 10, 10, 0.5),
            DetectionRecord::new(0, 5, 5, 15, 15, 0.9),
            DetectionRecord::new(2, 20, 20, 30, 30, 0.7),
        ]);
        let confidences: Vec<f32> = table.iter().map(|r| r.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.7, 0.5]);
    }

    #[test]
    fn equal_confidence_orders_by_label_then_coords() {
        let table = DetectionTable::from_detections(vec![
            DetectionRecord::new(1, 0, 0, 10, 10, 0.5),
            DetectionRecord::new(0, 50, 0, 60, 10, 0.5),
            DetectionRecord::new(0, 5, 0, 15, 10, 0.5),
        ]);
        assert_eq!(table.records[0].label, 0);
        assert_eq!(table.records[0].x1, 5);
        assert_eq!(table.records[1].x1, 50);
        assert_eq!(table.records[2].label, 1);
    }

    #[test]
    fn table_serializes_to_json() {
        let table = DetectionTable::from_detections(vec![DetectionRecord::new(
            3, 100, 100, 200, 200, 0.9,
        )]);
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"label\":3"));
        assert!(json.contains("\"x2\":200"));
    }
}
