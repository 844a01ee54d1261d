//! Core building blocks of the inference pipeline.
//!
//! This module holds the pieces everything else depends on:
//! - error types,
//! - pipeline configuration and validation helpers,
//! - the trait seams for the external tile source and detector.

pub mod config;
pub mod errors;
pub mod traits;
pub mod validation;

pub use config::{InferenceConfig, ParallelPolicy};
pub use errors::WsiError;
pub use traits::{Detector, DetectorParams, SourceMetadata, TileDetection, TileSource};
