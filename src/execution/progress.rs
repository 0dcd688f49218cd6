//! Progress tracking for batch runs.

use crate::core::types::ImageId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// The batch has started.
    Started { total_images: usize },
    /// An image has started processing.
    ImageStarted { image_id: ImageId },
    /// An image was filtered and encoded.
    ImageCompleted {
        image_id: ImageId,
        duration_ms: u64,
        index: usize,
        total: usize,
    },
    /// An image failed; the batch continues.
    ImageFailed { image_id: ImageId, message: String },
    /// Overall progress percentage.
    Progress {
        percent: f32,
        elapsed_ms: u64,
        estimated_remaining_ms: Option<u64>,
    },
    /// Every image has an outcome.
    Completed {
        total_duration_ms: u64,
        processed: usize,
        failed: usize,
    },
}

/// Callback type for progress updates.
///
/// Called from worker threads during parallel batches.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Counts finished images and forwards events to an optional callback.
pub struct ProgressTracker {
    total_images: usize,
    processed: AtomicU64,
    failed: AtomicU64,
    start_time: Option<Instant>,
    callback: Option<Arc<ProgressCallback>>,
    /// Per-image durations, for the remaining-time estimate.
    image_times: parking_lot::Mutex<Vec<u64>>,
}

impl ProgressTracker {
    pub fn new(total_images: usize) -> Self {
        Self {
            total_images,
            processed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            start_time: None,
            callback: None,
            image_times: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn with_callback(mut self, callback: Arc<ProgressCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started {
            total_images: self.total_images,
        });
    }

    pub fn image_started(&self, image_id: &ImageId) {
        self.send_update(ProgressUpdate::ImageStarted {
            image_id: image_id.clone(),
        });
    }

    pub fn image_completed(&self, image_id: &ImageId, duration_ms: u64) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) as usize + 1;
        self.image_times.lock().push(duration_ms);

        self.send_update(ProgressUpdate::ImageCompleted {
            image_id: image_id.clone(),
            duration_ms,
            index: processed + self.failed_count(),
            total: self.total_images,
        });
        self.send_progress_update();
    }

    pub fn image_failed(&self, image_id: &ImageId, duration_ms: u64, message: String) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.image_times.lock().push(duration_ms);

        self.send_update(ProgressUpdate::ImageFailed {
            image_id: image_id.clone(),
            message,
        });
        self.send_progress_update();
    }

    /// Complete tracking.
    pub fn complete(&self) {
        let duration = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Completed {
            total_duration_ms: duration,
            processed: self.processed_count(),
            failed: self.failed_count(),
        });
    }

    pub fn processed_count(&self) -> usize {
        self.processed.load(Ordering::Relaxed) as usize
    }

    pub fn failed_count(&self) -> usize {
        self.failed.load(Ordering::Relaxed) as usize
    }

    /// Share of images with an outcome, 0-100.
    pub fn progress_percent(&self) -> f32 {
        if self.total_images == 0 {
            return 100.0;
        }
        let done = self.processed_count() + self.failed_count();
        (done as f32 / self.total_images as f32) * 100.0
    }

    /// Estimate remaining time in milliseconds from the mean image time.
    ///
    /// Assumes sequential work; a parallel batch finishes sooner.
    pub fn estimated_remaining_ms(&self) -> Option<u64> {
        let times = self.image_times.lock();
        if times.is_empty() {
            return None;
        }

        let avg_time: u64 = times.iter().sum::<u64>() / times.len() as u64;
        let done = self.processed_count() + self.failed_count();
        let remaining = self.total_images.saturating_sub(done);

        Some(avg_time * remaining as u64)
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }

    fn send_progress_update(&self) {
        let elapsed = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Progress {
            percent: self.progress_percent(),
            elapsed_ms: elapsed,
            estimated_remaining_ms: self.estimated_remaining_ms(),
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_progress_counts_failures() {
        let tracker = ProgressTracker::new(4);
        assert_eq!(tracker.progress_percent(), 0.0);

        tracker.image_completed(&ImageId::from(1u64), 10);
        tracker.image_failed(&ImageId::from(2u64), 30, "bad bytes".to_string());
        assert_eq!(tracker.progress_percent(), 50.0);
        assert_eq!(tracker.processed_count(), 1);
        assert_eq!(tracker.failed_count(), 1);

        // mean of 10 and 30 over two remaining images
        assert_eq!(tracker.estimated_remaining_ms(), Some(40));
    }

    #[test]
    fn test_empty_batch_is_done() {
        let tracker = ProgressTracker::default();
        assert_eq!(tracker.progress_percent(), 100.0);
        assert_eq!(tracker.estimated_remaining_ms(), None);
    }

    #[test]
    fn test_callback_receives_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        let mut tracker = ProgressTracker::new(1).with_callback(Arc::new(Box::new(move |update: ProgressUpdate| {
            sink.lock().push(update);
        })));

        let id = ImageId::from("cat.png");
        tracker.start();
        tracker.image_started(&id);
        tracker.image_completed(&id, 5);
        tracker.complete();

        let events = events.lock();
        assert!(matches!(events[0], ProgressUpdate::Started { total_images: 1 }));
        assert!(matches!(events[1], ProgressUpdate::ImageStarted { .. }));
        assert!(matches!(events[2], ProgressUpdate::ImageCompleted { index: 1, total: 1, .. }));
        assert!(matches!(events[3], ProgressUpdate::Progress { .. }));
        assert!(matches!(
            events.last(),
            Some(ProgressUpdate::Completed { processed: 1, failed: 0, .. })
        ));
    }
}
