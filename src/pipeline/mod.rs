//! The tiled inference pipeline.
//!
//! Data flows strictly forward: grid planning → tile fetch/normalize →
//! batched detection → coordinate remap → global merge → result assembly.
//! The pipeline is stateless between invocations.

pub mod fetch;
pub mod grid;
pub mod mask;
pub mod remap;
pub mod result;
pub mod run;

pub use grid::{GridPlan, TileSpec};
pub use mask::{CoarseMask, MaskWindow};
pub use result::{DetectionRecord, DetectionTable};
pub use run::run_tiled_inference;
