//! Execution module.
//!
//! Runs filter pipelines on single images and on whole batches.

pub mod batch;
pub mod pipeline;
pub mod progress;

pub use batch::{BatchOptions, BatchOutcome, BatchProcessor, BatchReport, ItemStatus, ItemSummary, SourceImage};
pub use pipeline::{FilterPipeline, PipelineOutput, PipelineResult};
pub use progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
