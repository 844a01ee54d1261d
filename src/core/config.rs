//! Pipeline configuration.
//!
//! [`InferenceConfig`] carries every parameter of a tiled inference run and
//! validates itself before any tile work starts. [`ParallelPolicy`] tunes the
//! rayon-based tile fetching inside a batch.

use serde::{Deserialize, Serialize};

use crate::core::errors::WsiError;
use crate::core::traits::DetectorParams;
use crate::core::validation::{validate_non_negative, validate_positive, validate_unit_range};

/// Configuration for one tiled inference invocation.
///
/// Defaults match the parameters the detection CLIs ship with: 1280-pixel
/// tiles with a 960-pixel stride (25% overlap), batches of 10 tiles, and
/// white fill for padded or masked-out pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Canonical square tile side, in analysis-resolution pixels.
    pub tile_size: u32,
    /// Distance between consecutive tile origins. A stride smaller than
    /// `tile_size` produces overlapping tiles.
    pub stride: u32,
    /// Number of tiles submitted to the detector per invocation.
    pub batch_size: usize,
    /// IoU threshold shared by the detector's per-tile suppression and the
    /// global cross-tile merge. Overlaps strictly above it are suppressed.
    pub iou_threshold: f32,
    /// Confidence threshold forwarded to the detector.
    pub confidence_threshold: f32,
    /// A smaller box whose overlap with a larger surviving box exceeds this
    /// fraction of its own area is dropped after suppression.
    pub contained_threshold: f32,
    /// A tile is analyzed only if its coarse-mask coverage is strictly above
    /// this fraction. Values above 1 select no tiles at all.
    pub mask_threshold: f32,
    /// RGB colour used for border padding and masked-out pixels.
    pub fill: [u8; 3],
    /// Magnification to analyze at. `None`, or a source without a reported
    /// magnification, analyzes at native scan resolution.
    pub magnification: Option<f32>,
    /// Frame of a multiplex image to analyze.
    pub frame: Option<usize>,
    /// Maximum detections the detector may return per tile.
    pub max_detections: usize,
    /// Parallelism tuning for tile fetches within a batch.
    #[serde(default)]
    pub parallel: ParallelPolicy,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            tile_size: 1280,
            stride: 960,
            batch_size: 10,
            iou_threshold: 0.6,
            confidence_threshold: 0.5,
            contained_threshold: 0.8,
            mask_threshold: 0.2,
            fill: [255, 255, 255],
            magnification: None,
            frame: None,
            max_detections: 1000,
            parallel: ParallelPolicy::default(),
        }
    }
}

impl InferenceConfig {
    /// Validates the configuration, failing fast before any tile work.
    ///
    /// `mask_threshold` is deliberately allowed above 1: the coverage
    /// comparison is strict, so such a value selects no tiles, which is a
    /// legitimate way to express "nothing passes".
    pub fn validate(&self) -> Result<(), WsiError> {
        validate_positive(self.tile_size, "tile_size")?;
        validate_positive(self.stride, "stride")?;
        validate_positive(self.batch_size as u64, "batch_size")?;
        validate_positive(self.max_detections as u64, "max_detections")?;
        validate_unit_range(self.iou_threshold, "iou_threshold")?;
        validate_unit_range(self.confidence_threshold, "confidence_threshold")?;
        validate_unit_range(self.contained_threshold, "contained_threshold")?;
        validate_non_negative(self.mask_threshold, "mask_threshold")?;
        if let Some(mag) = self.magnification {
            validate_positive(mag, "magnification")?;
        }
        Ok(())
    }

    /// Detector hyperparameters derived from this configuration.
    pub(crate) fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            max_detections: self.max_detections,
            iou_threshold: self.iou_threshold,
            confidence_threshold: self.confidence_threshold,
            input_size: self.tile_size,
        }
    }
}

/// Tuning for parallel tile fetching.
///
/// The only intra-batch parallelism in the pipeline is the embarrassingly
/// parallel fetch + normalize step; batches below `fetch_threshold` run
/// sequentially to avoid pool overhead on small work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads for the global rayon pool. `None` keeps
    /// rayon's default (typically the number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,
    /// Batches with fewer tiles than this are fetched sequentially.
    #[serde(default = "ParallelPolicy::default_fetch_threshold")]
    pub fetch_threshold: usize,
}

impl ParallelPolicy {
    /// Creates a policy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Sets the sequential-fetch threshold.
    pub fn with_fetch_threshold(mut self, threshold: usize) -> Self {
        self.fetch_threshold = threshold;
        self
    }

    /// Installs the global rayon thread pool with the configured size.
    ///
    /// Call once at application startup, before any inference runs. Does
    /// nothing when `max_threads` is `None`.
    pub fn install_global_thread_pool(&self) -> Result<bool, rayon::ThreadPoolBuildError> {
        if let Some(num_threads) = self.max_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn default_fetch_threshold() -> usize {
        4
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            fetch_threshold: Self::default_fetch_threshold(),
        }
    }
}
