//! # pixbatch - Batch Image Filtering
//!
//! pixbatch applies a fixed catalog of pixel filters to batches of images and
//! keeps track of the derivatives each run produces.
//!
//! ## Features
//!
//! - **Fixed-order pipeline**: brightness, contrast, saturation, vintage, edge
//!   detection, sharpen, face detection and blur always run in that order
//! - **Pure stages**: every stage takes an owned raster and returns a new one
//! - **Independent batches**: one outcome per image, failures never abort a batch
//! - **Parallel execution**: optional rayon worker pool, results in input order
//! - **Reconciliation**: pick the current derivative per original, dedupe by
//!   parameter fingerprint, list exports
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pixbatch::prelude::*;
//!
//! let config = FilterConfiguration::default()
//!     .with_brightness(75)
//!     .with_flag(FilterKey::Vintage, true);
//! let enabled = EnabledFilters::from_config(&config);
//! let pipeline = FilterPipeline::new(&config, &enabled, OutputSpec::png());
//!
//! let processor = BatchProcessor::new(pipeline)
//!     .with_options(BatchOptions::new().with_max_threads(4));
//! let (outcomes, report) = processor.run_report(&[
//!     SourceImage::new("cat.jpg", std::fs::read("cat.jpg")?),
//!     SourceImage::new("dog.jpg", std::fs::read("dog.jpg")?),
//! ]);
//! println!("{} processed, {} failed", report.processed, report.failed);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: raster buffers, output formats and error types
//! - [`filters`]: filter keys, configurations, the stage algorithms and the catalog
//! - [`execution`]: the pipeline, the batch processor and progress tracking
//! - [`reconcile`]: derivative records, naming, resolution and planning

#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod filters;
pub mod reconcile;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use pixbatch::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::raster::RasterBuffer;
    pub use crate::core::types::{ImageId, OutputFormat, OutputSpec, Quality};

    // Errors
    pub use crate::core::error::{
        ConfigError, DecodeError, EncodeError, PipelineError, PixbatchError, PixbatchResult, ReconcileError,
        UnsupportedFormatError,
    };

    // Filters
    pub use crate::filters::catalog::{FilterCatalog, FilterCategory, FilterDescriptor};
    pub use crate::filters::config::{EnabledFilters, FilterConfiguration, FilterKey, FilterKind};
    pub use crate::filters::stage::FilterStage;

    // Execution
    pub use crate::execution::batch::{BatchOptions, BatchOutcome, BatchProcessor, BatchReport, SourceImage};
    pub use crate::execution::pipeline::{FilterPipeline, PipelineOutput, PipelineResult};
    pub use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};

    // Reconciliation
    pub use crate::reconcile::{
        DerivativeLedger, DerivativeRecord, DerivativeResolver, DerivativeStatus, ExportEntry, MatchPolicy,
        OriginalImage, PlanAction, ReconciliationPlanner,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "pixbatch");
    }

    #[test]
    fn test_gray_brightness_example() {
        let source = RasterBuffer::filled(4, 4, [128, 128, 128, 255])
            .encode(OutputSpec::png())
            .unwrap();

        let config = FilterConfiguration::default().with_brightness(75);
        let enabled = EnabledFilters::new()
            .with(FilterKey::Brightness)
            .with(FilterKey::Contrast)
            .with(FilterKey::Saturation);
        let pipeline = FilterPipeline::new(&config, &enabled, OutputSpec::png());

        let output = pipeline.run_bytes(&source).unwrap();
        assert_eq!(
            output.applied,
            vec![FilterKey::Brightness, FilterKey::Contrast, FilterKey::Saturation]
        );
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(output.raster.pixel(x, y), [153, 153, 153, 255]);
            }
        }
    }

    #[test]
    fn test_batch_then_resolve() {
        let config = FilterConfiguration::default().with_flag(FilterKey::Vintage, true);
        let pipeline = FilterPipeline::from_config(&config, OutputSpec::png());
        let originals = [
            OriginalImage::new("1", "beach.png"),
            OriginalImage::new("2", "forest.png"),
        ];

        let images: Vec<SourceImage> = originals
            .iter()
            .enumerate()
            .map(|(i, original)| {
                let bytes = if i == 1 {
                    Vec::new()
                } else {
                    RasterBuffer::filled(3, 3, [200, 120, 40, 255]).encode(OutputSpec::png()).unwrap()
                };
                SourceImage::new(original.file_name.as_str(), bytes)
            })
            .collect();

        let outcomes = BatchProcessor::new(pipeline.clone()).run_batch(&images);

        let ledger = DerivativeLedger::new();
        for (original, outcome) in originals.iter().zip(&outcomes) {
            let record = ledger.begin(&original.file_name, pipeline.output().format, None);
            ledger
                .finish(record.id, &outcome.result, format!("/derivatives/{}", record.id))
                .unwrap();
        }

        let records = ledger.records();
        let planner = ReconciliationPlanner::default();
        let pairs = planner.pair_for_comparison(&originals, &records);
        assert!(pairs[0].derivative.is_some());
        assert!(pairs[1].derivative.is_none());
        assert_eq!(ledger.count_by_status(DerivativeStatus::Failed), 1);

        let exports = planner.export_current(&originals, &records);
        assert_eq!(exports.len(), 1);
        assert!(exports[0].archive_name.ends_with("_filtered_beach.png"));
    }
}
