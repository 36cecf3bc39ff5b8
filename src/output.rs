//! Result types produced by the pipeline.
//!
//! The central type is [`PageResult`]: one per processed page, carrying an
//! explicit success/failure [`PageOutcome`] instead of relying on an
//! exception boundary. The assembler filters on the success variant; the
//! failure variant carries the contained [`PageError`] for diagnostics.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of processing one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PageOutcome {
    /// The page rendered, the backend answered, and the response was
    /// normalised. The text is final: it is never re-normalised after this
    /// point.
    Text(String),
    /// Rendering, inference, or encoding failed for this page.
    Failed(PageError),
}

/// Result of processing one page of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number within the document.
    pub page_number: usize,
    pub outcome: PageOutcome,
}

impl PageResult {
    pub fn success(page_number: usize, text: String) -> Self {
        Self {
            page_number,
            outcome: PageOutcome::Text(text),
        }
    }

    pub fn failure(page_number: usize, error: PageError) -> Self {
        Self {
            page_number,
            outcome: PageOutcome::Failed(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, PageOutcome::Text(_))
    }

    /// The normalised page text, if the page succeeded.
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            PageOutcome::Text(t) => Some(t),
            PageOutcome::Failed(_) => None,
        }
    }

    /// The page error, if the page failed.
    pub fn error(&self) -> Option<&PageError> {
        match &self.outcome {
            PageOutcome::Text(_) => None,
            PageOutcome::Failed(e) => Some(e),
        }
    }
}

/// Per-document accounting for the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub base_name: String,
    pub page_count: usize,
    pub pages_succeeded: usize,
    pub pages_failed: usize,
    /// Written artifact, absent when every page failed (or the write failed).
    pub artifact: Option<PathBuf>,
}

/// Accounting for a whole batch run.
///
/// Returned by [`crate::run::run`] and rendered by the CLI (`--json` prints
/// it verbatim). A run that executed is a success regardless of how many
/// pages failed; callers inspect the counters to decide their own tolerance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Inputs matched by the selector.
    pub documents_discovered: usize,
    /// Documents that produced an artifact.
    pub documents_converted: usize,
    /// Documents skipped because they could not be opened.
    pub documents_skipped: usize,
    pub pages_succeeded: usize,
    pub pages_failed: usize,
    pub documents: Vec<DocumentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_accessors() {
        let r = PageResult::success(3, "hello".into());
        assert!(r.is_success());
        assert_eq!(r.text(), Some("hello"));
        assert!(r.error().is_none());
    }

    #[test]
    fn failure_accessors() {
        let r = PageResult::failure(
            2,
            PageError::Inference {
                page: 2,
                detail: "boom".into(),
            },
        );
        assert!(!r.is_success());
        assert!(r.text().is_none());
        assert_eq!(r.error().map(|e| e.page()), Some(2));
    }

    #[test]
    fn page_result_round_trips_through_json() {
        let r = PageResult::success(1, "text".into());
        let json = serde_json::to_string(&r).unwrap();
        let back: PageResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.page_number, 1);
        assert_eq!(back.text(), Some("text"));
    }
}
