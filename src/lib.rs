//! Tiled inference over whole-slide images.
//!
//! Whole-slide scans are far too large to feed to an object detector in one
//! pass. This crate tiles a slide into fixed-size (optionally overlapping)
//! square tiles, batches the tiles through an externally supplied detector,
//! remaps every tile-local detection back into slide coordinates, and merges
//! duplicate detections of the same physical object with global non-max
//! suppression followed by a containment-pruning pass.
//!
//! The two external collaborators are capability traits:
//! - [`TileSource`] reads rectangular regions out of the slide (and reports
//!   its dimensions and native scan magnification),
//! - [`Detector`] turns a batch of fixed-size RGB tiles into per-tile
//!   detections.
//!
//! A coarse low-resolution [`CoarseMask`] can restrict analysis to regions of
//! interest; tiles whose mask coverage falls at or below the configured
//! threshold are skipped, and partially covered tiles have their out-of-mask
//! pixels blanked with the fill colour before the detector sees them.
//!
//! The entry point is [`run_tiled_inference`]:
//!
//! ```no_run
//! use wsi_infer::{InferenceConfig, run_tiled_inference};
//! # fn demo(source: &dyn wsi_infer::TileSource, detector: &dyn wsi_infer::Detector)
//! #     -> Result<(), wsi_infer::WsiError> {
//! let config = InferenceConfig::default();
//! let table = run_tiled_inference(source, detector, None, &config)?;
//! for record in &table.records {
//!     println!("{} {:?}", record.label, (record.x1, record.y1, record.x2, record.y2));
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod pipeline;
pub mod processors;

pub use crate::core::config::{InferenceConfig, ParallelPolicy};
pub use crate::core::errors::WsiError;
pub use crate::core::traits::{Detector, DetectorParams, SourceMetadata, TileDetection, TileSource};
pub use crate::pipeline::grid::{GridPlan, TileSpec};
pub use crate::pipeline::mask::CoarseMask;
pub use crate::pipeline::result::{DetectionRecord, DetectionTable};
pub use crate::pipeline::run::run_tiled_inference;
pub use crate::processors::geometry::{BoundingBox, Point};
