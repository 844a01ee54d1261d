//! End-to-end tiled inference.
//!
//! [`run_tiled_inference`] is the crate's single entry point. It plans the
//! tile grid, fetches and normalises tiles batch by batch, runs the detector,
//! remaps every detection to native slide coordinates, and merges duplicates
//! produced by overlapping tiles into one table.

use rayon::prelude::*;

use crate::core::config::InferenceConfig;
use crate::core::errors::WsiError;
use crate::core::traits::{Detector, TileSource};
use crate::pipeline::fetch::{fetch_tile, FetchParams};
use crate::pipeline::grid::{GridPlan, TileSpec};
use crate::pipeline::mask::CoarseMask;
use crate::pipeline::remap::remap_detection;
use crate::pipeline::result::{DetectionRecord, DetectionTable};
use crate::processors::merge::{non_max_suppression, remove_contained_boxes};

/// Runs tiled inference over one slide and returns the merged detections.
///
/// The run either completes fully or returns the first error; there are no
/// partial results. A slide whose grid or mask selects no tiles, or whose
/// tiles contain no detections, yields an empty table.
pub fn run_tiled_inference(
    source: &dyn TileSource,
    detector: &dyn Detector,
    mask: Option<&CoarseMask>,
    config: &InferenceConfig,
) -> Result<DetectionTable, WsiError> {
    config.validate()?;

    let metadata = source.metadata()?;
    if metadata.width <= 0 || metadata.height <= 0 {
        return Err(WsiError::source_contract(format!(
            "source reported non-positive dimensions {}x{}",
            metadata.width, metadata.height
        )));
    }

    // One analysis pixel covers `mag_to_native` native pixels. Without a
    // requested magnification, or when the source does not report one,
    // analysis happens at scan resolution.
    let mag_to_native = match (metadata.magnification, config.magnification) {
        (Some(native), Some(requested)) => native as f64 / requested as f64,
        _ => 1.0,
    };
    let native_tile_size = (config.tile_size as f64 * mag_to_native) as i64;
    let native_stride = (config.stride as f64 * mag_to_native) as i64;

    let tiles: Vec<TileSpec> = GridPlan::new(
        metadata.width,
        metadata.height,
        native_tile_size,
        native_stride,
        mask,
        config.mask_threshold as f64,
    )?
    .collect();

    let batch_count = tiles.len().div_ceil(config.batch_size.max(1));
    tracing::info!(
        width = metadata.width,
        height = metadata.height,
        tiles = tiles.len(),
        batches = batch_count,
        "planned tile grid"
    );

    let fetch_params = FetchParams {
        tile_size: config.tile_size,
        native_tile_size,
        fill: config.fill,
        magnification: config.magnification,
        frame: config.frame,
    };
    let detector_params = config.detector_params();

    let mut detections: Vec<DetectionRecord> = Vec::new();
    for (batch_index, chunk) in tiles.chunks(config.batch_size).enumerate() {
        let images = if chunk.len() >= config.parallel.fetch_threshold {
            chunk
                .par_iter()
                .map(|spec| fetch_tile(source, spec, mask, &fetch_params))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            chunk
                .iter()
                .map(|spec| fetch_tile(source, spec, mask, &fetch_params))
                .collect::<Result<Vec<_>, _>>()?
        };

        let outputs = detector.detect_batch(&images, &detector_params)?;
        if outputs.len() != chunk.len() {
            return Err(WsiError::detector_contract(
                batch_index,
                format!("expected {} outputs, got {}", chunk.len(), outputs.len()),
            ));
        }

        let mut batch_detections = 0usize;
        for (spec, tile_output) in chunk.iter().zip(&outputs) {
            if tile_output.len() > config.max_detections {
                return Err(WsiError::detector_contract(
                    batch_index,
                    format!(
                        "tile at ({}, {}) returned {} detections, limit is {}",
                        spec.x,
                        spec.y,
                        tile_output.len(),
                        config.max_detections
                    ),
                ));
            }
            batch_detections += tile_output.len();
            detections.extend(
                tile_output
                    .iter()
                    .map(|det| remap_detection(det, spec.x, spec.y, mag_to_native)),
            );
        }
        tracing::debug!(
            batch = batch_index,
            tiles = chunk.len(),
            detections = batch_detections,
            "processed batch"
        );
    }

    let before = detections.len();
    let kept = non_max_suppression(detections, config.iou_threshold);
    let kept = remove_contained_boxes(kept, config.contained_threshold);
    tracing::info!(
        raw = before,
        merged = kept.len(),
        "merged overlapping detections"
    );

    Ok(DetectionTable::from_detections(kept))
}
