//! Error types for the tiled inference pipeline.
//!
//! The pipeline has no partial-result mode: an invocation either produces a
//! complete detection table or fails with one of the variants below. A
//! silently skipped tile would yield an incomplete, misleadingly confident
//! result, so source and detector failures abort the whole run.

use thiserror::Error;

/// Errors that can occur while running tiled inference.
#[derive(Error, Debug)]
pub enum WsiError {
    /// Invalid pipeline parameters. Raised before any tile work begins and
    /// never retried.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration problem.
        message: String,
    },

    /// The tile source failed to return metadata or a region raster.
    ///
    /// Retry policy, if any, belongs to the tile-source implementation; the
    /// pipeline propagates the failure and aborts the invocation.
    #[error("tile source read failed: {context}")]
    SourceRead {
        /// What was being read when the failure occurred.
        context: String,
        /// The underlying error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The detector failed on a batch of tiles.
    #[error("detector failed on batch {batch_index}: {context}")]
    Detector {
        /// Index of the batch that failed.
        batch_index: usize,
        /// Additional context about the failure.
        context: String,
        /// The underlying error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WsiError {
    /// Creates a configuration error from a plain message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a configuration error with context and details.
    ///
    /// # Example
    ///
    /// ```
    /// # use wsi_infer::WsiError;
    /// let err = WsiError::config_detailed("grid planning", "stride must be positive, got 0");
    /// assert!(matches!(err, WsiError::Config { .. }));
    /// ```
    pub fn config_detailed(context: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Config {
            message: format!("{}: {}", context.into(), details.into()),
        }
    }

    /// Wraps an error returned by the tile source.
    pub fn source_read(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SourceRead {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Reports a tile-source contract violation that has no underlying error,
    /// e.g. a region raster larger than the canonical tile.
    pub fn source_contract(context: impl Into<String>) -> Self {
        Self::SourceRead {
            context: context.into(),
            source: None,
        }
    }

    /// Wraps an error returned by the detector for a given batch.
    pub fn detector(
        batch_index: usize,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Detector {
            batch_index,
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Reports a detector contract violation, e.g. a per-tile output count
    /// that does not match the submitted batch.
    pub fn detector_contract(batch_index: usize, context: impl Into<String>) -> Self {
        Self::Detector {
            batch_index,
            context: context.into(),
            source: None,
        }
    }
}
