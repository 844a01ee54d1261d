//! Trait seams for the pipeline's external collaborators.
//!
//! The pipeline never opens slide files or runs models itself. It talks to a
//! [`TileSource`] for raster access and to a [`Detector`] for inference, both
//! specified purely by contract. Implementations wrap whatever backend is in
//! use (a slide-format reader, a remote tile server, an ONNX session, a test
//! fake) and are shared read-only across any concurrent tile workers.

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::core::errors::WsiError;

/// Static description of a slide as reported by its tile source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Slide width in native-resolution pixels.
    pub width: i64,
    /// Slide height in native-resolution pixels.
    pub height: i64,
    /// Native scan magnification, when the format records one.
    pub magnification: Option<f32>,
}

/// Read access to a large source image.
///
/// Implementations must tolerate region requests that extend past the
/// right/bottom edge of the slide by returning a shorter raster rather than
/// an error; the tile fetcher performs the padding. Returned rasters may be
/// single-channel; the fetcher replicates them to RGB.
pub trait TileSource: Send + Sync {
    /// Returns the slide dimensions and native magnification.
    fn metadata(&self) -> Result<SourceMetadata, WsiError>;

    /// Reads the raster covering `[left, right) x [top, bottom)` in
    /// native-resolution coordinates, rescaled to `magnification` when one is
    /// given, from the given `frame` of a multiplex image.
    fn read_region(
        &self,
        left: i64,
        top: i64,
        right: i64,
        bottom: i64,
        magnification: Option<f32>,
        frame: Option<usize>,
    ) -> Result<DynamicImage, WsiError>;
}

/// Detector hyperparameters forwarded with every batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Maximum number of detections the model may return per tile.
    pub max_detections: usize,
    /// IoU threshold for the detector's own per-tile suppression.
    pub iou_threshold: f32,
    /// Detections below this confidence are discarded by the detector.
    pub confidence_threshold: f32,
    /// Square side length of the tiles in the batch.
    pub input_size: u32,
}

/// One detection in tile-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDetection {
    /// Integer class id assigned by the model.
    pub label: u32,
    /// `[x1, y1, x2, y2]` corners in tile-local pixels, `x2 >= x1`, `y2 >= y1`.
    pub bbox: [f32; 4],
    /// Confidence score in `[0, 1]`.
    pub confidence: f32,
}

/// An already-trained object detector operating on fixed-size RGB tiles.
///
/// Batching exists purely to amortize invocation overhead: the output must
/// contain exactly one entry per input tile, and detections for one tile must
/// not be influenced by the other tiles in the batch.
pub trait Detector: Send + Sync {
    /// Runs the model on a batch of normalized tiles and returns per-tile
    /// detections in tile-local coordinates.
    fn detect_batch(
        &self,
        tiles: &[RgbImage],
        params: &DetectorParams,
    ) -> Result<Vec<Vec<TileDetection>>, WsiError>;
}
