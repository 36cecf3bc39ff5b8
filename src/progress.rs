//! Progress-observer trait for run, document, and page events.
//!
//! Inject an `Arc<dyn PipelineProgress>` via
//! [`crate::config::PipelineConfigBuilder::progress`] to receive events as
//! the batch advances. Callbacks are the least-invasive integration point:
//! the CLI forwards them to a terminal progress bar, embedders can forward
//! them anywhere, and the library knows nothing about either.
//!
//! The run is strictly sequential, so events always arrive in order:
//! run start, then for each document its pages 1..N, then the next
//! document. Implementations still must be `Send + Sync` because page
//! rendering hops through the blocking pool.

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as the batch advances.
///
/// All methods have default no-op implementations so observers only
/// override what they care about.
pub trait PipelineProgress: Send + Sync {
    /// Called once after discovery, before any document is processed.
    fn on_run_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document's pages have been enumerated and processing
    /// is about to begin. `index` is 0-based discovery order.
    fn on_document_start(&self, index: usize, name: &str, page_count: usize) {
        let _ = (index, name, page_count);
    }

    /// Called when a document is skipped because it could not be opened.
    fn on_document_skipped(&self, index: usize, name: &str, reason: &str) {
        let _ = (index, name, reason);
    }

    /// Called just before a page is rendered.
    fn on_page_start(&self, page_number: usize, page_count: usize) {
        let _ = (page_number, page_count);
    }

    /// Called when a page produced normalised text.
    fn on_page_done(&self, page_number: usize, page_count: usize, text_len: usize) {
        let _ = (page_number, page_count, text_len);
    }

    /// Called when a page failed (render or inference).
    fn on_page_failed(&self, page_number: usize, page_count: usize, error: &str) {
        let _ = (page_number, page_count, error);
    }

    /// Called after assembly for a document. `artifact` is `None` when no
    /// page succeeded (or the write failed).
    fn on_document_done(&self, index: usize, name: &str, artifact: Option<&Path>) {
        let _ = (index, name, artifact);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl PipelineProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressHandle = Arc<dyn PipelineProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingProgress {
        documents: AtomicUsize,
        pages_done: AtomicUsize,
        pages_failed: AtomicUsize,
        skipped: AtomicUsize,
    }

    impl PipelineProgress for TrackingProgress {
        fn on_document_start(&self, _index: usize, _name: &str, _page_count: usize) {
            self.documents.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_skipped(&self, _index: usize, _name: &str, _reason: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_done(&self, _page_number: usize, _page_count: usize, _text_len: usize) {
            self.pages_done.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_failed(&self, _page_number: usize, _page_count: usize, _error: &str) {
            self.pages_failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_progress_does_not_panic() {
        let p = NoopProgress;
        p.on_run_start(2);
        p.on_document_start(0, "a", 3);
        p.on_page_start(1, 3);
        p.on_page_done(1, 3, 42);
        p.on_page_failed(2, 3, "backend fault");
        p.on_document_done(0, "a", None);
        p.on_document_skipped(1, "b", "corrupt");
    }

    #[test]
    fn tracking_progress_counts_events() {
        let p = TrackingProgress::default();
        p.on_document_start(0, "doc", 2);
        p.on_page_done(1, 2, 10);
        p.on_page_failed(2, 2, "fault");
        p.on_document_skipped(1, "other", "corrupt");

        assert_eq!(p.documents.load(Ordering::SeqCst), 1);
        assert_eq!(p.pages_done.load(Ordering::SeqCst), 1);
        assert_eq!(p.pages_failed.load(Ordering::SeqCst), 1);
        assert_eq!(p.skipped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_progress_works() {
        let p: Arc<dyn PipelineProgress> = Arc::new(NoopProgress);
        p.on_run_start(1);
        p.on_page_done(1, 1, 128);
    }
}
