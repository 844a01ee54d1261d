//! Geometric primitives for detection merging.
//!
//! Detection boxes are carried as polygons even though every box the pipeline
//! produces is an axis-aligned quadrilateral: the merge passes only rely on
//! area and intersection, so the representation stays open to non-rectangular
//! regions of interest.

use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A detection box represented by its corner points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    /// The points that outline the box.
    pub points: Vec<Point>,
}

impl BoundingBox {
    /// Creates a bounding box from a vector of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates an axis-aligned box from its top-left and bottom-right corners.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let points = vec![
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        ];
        Self { points }
    }

    /// Returns a new box translated by `(dx, dy)`.
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.points
                .iter()
                .map(|p| Point::new(p.x + dx, p.y + dy))
                .collect(),
        )
    }

    /// Polygon area via the shoelace formula.
    ///
    /// Returns 0.0 for fewer than 3 points.
    pub fn area(&self) -> f32 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        let n = self.points.len();
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area.abs() / 2.0
    }

    /// Minimum x-coordinate over all points.
    pub fn x_min(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.x)
            .fold(f32::INFINITY, f32::min)
    }

    /// Minimum y-coordinate over all points.
    pub fn y_min(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.y)
            .fold(f32::INFINITY, f32::min)
    }

    /// Maximum x-coordinate over all points.
    pub fn x_max(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.x)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Maximum y-coordinate over all points.
    pub fn y_max(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.y)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Area of intersection with another box, computed on the axis-aligned
    /// bounds of both polygons. Returns 0.0 when they do not intersect.
    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let inter_x_min = self.x_min().max(other.x_min());
        let inter_y_min = self.y_min().max(other.y_min());
        let inter_x_max = self.x_max().min(other.x_max());
        let inter_y_max = self.y_max().min(other.y_max());

        if inter_x_min >= inter_x_max || inter_y_min >= inter_y_max {
            return 0.0;
        }

        (inter_x_max - inter_x_min) * (inter_y_max - inter_y_min)
    }

    /// Intersection over union with another box.
    ///
    /// The union is computed from the axis-aligned bounds for consistency
    /// with [`BoundingBox::intersection_area`].
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter_area = self.intersection_area(other);
        if inter_area <= 0.0 {
            return 0.0;
        }

        let self_area = (self.x_max() - self.x_min()) * (self.y_max() - self.y_min());
        let other_area = (other.x_max() - other.x_min()) * (other.y_max() - other.y_min());
        let union_area = self_area + other_area - inter_area;

        if union_area <= 0.0 {
            return 0.0;
        }

        inter_area / union_area
    }

    /// Intersection over this box's own area: the fraction of this box that
    /// lies inside `other`. Asymmetric: a small box nested inside a large
    /// one can have low IoU yet an IoA close to 1.
    pub fn ioa(&self, other: &BoundingBox) -> f32 {
        let inter_area = self.intersection_area(other);
        if inter_area <= 0.0 {
            return 0.0;
        }

        let self_area = (self.x_max() - self.x_min()) * (self.y_max() - self.y_min());
        if self_area <= 0.0 {
            return 0.0;
        }

        inter_area / self_area
    }
}
