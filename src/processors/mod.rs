//! Geometry primitives and detection-merging passes.

pub mod geometry;
pub mod merge;

pub use geometry::{BoundingBox, Point};
pub use merge::{non_max_suppression, remove_contained_boxes};
