//! Batch processing: one pipeline, many independent images.
//!
//! Every source image gets exactly one [`BatchOutcome`], in input order. A
//! failure is recorded against its image and never stops the rest of the
//! batch. Parallel runs use rayon; outcomes are collected back into input
//! order, so sequential and parallel runs produce identical outcome lists.

use crate::core::error::PipelineError;
use crate::core::raster::RasterBuffer;
use crate::core::types::{ImageId, OutputFormat};
use crate::execution::pipeline::{FilterPipeline, PipelineOutput, PipelineResult};
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
use crate::filters::config::FilterKey;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Batch options.
#[derive(Clone)]
pub struct BatchOptions {
    /// Process images on a worker pool.
    pub parallel: bool,
    /// Maximum number of worker threads (0 = rayon's global pool).
    pub max_threads: usize,
    /// Progress callback.
    pub progress_callback: Option<Arc<ProgressCallback>>,
}

impl std::fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOptions")
            .field("parallel", &self.parallel)
            .field("max_threads", &self.max_threads)
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0,
            progress_callback: None,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads = max;
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }
}

/// Encoded source bytes for one image of a batch.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: ImageId,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(id: impl Into<ImageId>, bytes: Vec<u8>) -> Self {
        Self { id: id.into(), bytes }
    }
}

/// Outcome for one image.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub image_id: ImageId,
    pub result: PipelineResult,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn output(&self) -> Option<&PipelineOutput> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.result.as_ref().err()
    }

    pub fn summary(&self) -> ItemSummary {
        match &self.result {
            Ok(output) => ItemSummary {
                image_id: self.image_id.clone(),
                status: ItemStatus::Completed,
                applied: output.applied.clone(),
                format: Some(output.format),
                size_bytes: Some(output.bytes.len()),
                error: None,
            },
            Err(error) => ItemSummary {
                image_id: self.image_id.clone(),
                status: ItemStatus::Failed,
                applied: Vec::new(),
                format: None,
                size_bytes: None,
                error: Some(error.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Completed,
    Failed,
}

/// Serializable per-image line of a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub image_id: ImageId,
    pub status: ItemStatus,
    pub applied: Vec<FilterKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PipelineError>,
}

/// Aggregate of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub items: Vec<ItemSummary>,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: &[BatchOutcome], duration: Duration) -> Self {
        let items: Vec<ItemSummary> = outcomes.iter().map(BatchOutcome::summary).collect();
        let processed = items.iter().filter(|i| i.status == ItemStatus::Completed).count();

        Self {
            total: items.len(),
            processed,
            failed: items.len() - processed,
            duration_ms: duration.as_millis() as u64,
            items,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs one [`FilterPipeline`] over every image of a batch.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    pipeline: FilterPipeline,
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(pipeline: FilterPipeline) -> Self {
        Self {
            pipeline,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    /// Decode, filter and encode every image.
    pub fn run_batch(&self, images: &[SourceImage]) -> Vec<BatchOutcome> {
        let images: Vec<&SourceImage> = images.iter().collect();
        self.run_each(images, |image| image.id.clone(), |image| self.pipeline.run_bytes(&image.bytes))
    }

    /// Like [`run_batch`](Self::run_batch) for images that are already decoded.
    pub fn run_rasters(&self, images: Vec<(ImageId, RasterBuffer)>) -> Vec<BatchOutcome> {
        self.run_each(images, |(id, _)| id.clone(), |(_, raster)| self.pipeline.run(raster))
    }

    /// Run and summarize in one call.
    pub fn run_report(&self, images: &[SourceImage]) -> (Vec<BatchOutcome>, BatchReport) {
        let started = Instant::now();
        let outcomes = self.run_batch(images);
        let report = BatchReport::from_outcomes(&outcomes, started.elapsed());
        (outcomes, report)
    }

    fn run_each<T, I, F>(&self, items: Vec<T>, identify: I, process: F) -> Vec<BatchOutcome>
    where
        T: Send,
        I: Fn(&T) -> ImageId + Sync,
        F: Fn(T) -> PipelineResult + Sync,
    {
        let started = Instant::now();
        let mut tracker = ProgressTracker::new(items.len());
        if let Some(callback) = &self.options.progress_callback {
            tracker = tracker.with_callback(callback.clone());
        }
        tracker.start();

        let run_one = |item: T| -> BatchOutcome {
            let image_id = identify(&item);
            tracker.image_started(&image_id);

            let item_started = Instant::now();
            let result = process(item);
            let elapsed = item_started.elapsed().as_millis() as u64;

            match &result {
                Ok(output) => {
                    log::debug!("Image {} done, applied {:?}", image_id, output.applied_names());
                    tracker.image_completed(&image_id, elapsed);
                }
                Err(error) => {
                    log::warn!("Image {} failed: {}", image_id, error);
                    tracker.image_failed(&image_id, elapsed, error.to_string());
                }
            }

            BatchOutcome { image_id, result }
        };

        let outcomes: Vec<BatchOutcome> = if !self.options.parallel || items.len() < 2 {
            items.into_iter().map(run_one).collect()
        } else if self.options.max_threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.max_threads)
                .build()
            {
                Ok(pool) => pool.install(|| items.into_par_iter().map(run_one).collect()),
                Err(error) => {
                    log::warn!("Falling back to the global thread pool: {}", error);
                    items.into_par_iter().map(run_one).collect()
                }
            }
        } else {
            items.into_par_iter().map(run_one).collect()
        };

        tracker.complete();
        log::info!(
            "Batch finished: {} processed, {} failed in {:?}",
            tracker.processed_count(),
            tracker.failed_count(),
            started.elapsed()
        );

        outcomes
    }
}
