//! Error types for the docs2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Run- or document-level**: the run cannot start
//!   (bad pattern, nothing matched, backend not configured) or a whole
//!   document cannot be handled (unopenable file, artifact write failure).
//!   Document-level variants are contained by the per-document loop in
//!   [`crate::run`]; only the run-level ones end the batch.
//!
//! * [`PageError`] — **Page-level**: a single page failed to render or the
//!   backend raised for it. Stored inside [`crate::output::PageResult`] and
//!   never propagated past the page processor, so one bad page costs one
//!   page, not a document.

use std::path::PathBuf;
use thiserror::Error;

/// Run- and document-level errors.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Discovery errors ──────────────────────────────────────────────────
    /// The input selector is not a valid glob pattern.
    #[error("invalid input pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The selector matched no PDF or image files; the run ends here.
    #[error("no input files match '{pattern}'\nExpected PDF, PNG, or JPEG files.")]
    NoInputsMatched { pattern: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// A document could not be opened for page enumeration. The run skips
    /// this document and continues with the next one.
    #[error("cannot open document '{path}': {detail}")]
    DocumentOpen { path: PathBuf, detail: String },

    // ── Backend errors ────────────────────────────────────────────────────
    /// No inference backend could be resolved (missing API key etc.).
    #[error("inference backend '{provider}' is not configured.\n{hint}")]
    BackendNotConfigured { provider: String, hint: String },

    /// The backend raised for a single call. Opaque and non-retryable; the
    /// page processor converts this into a [`PageError::Inference`].
    #[error("inference backend error: {detail}")]
    Inference { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The workspace directory could not be created.
    #[error("failed to create workspace '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The assembled artifact could not be written. Reported for that
    /// document only; the run continues.
    #[error("failed to write artifact '{path}': {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A contained error for a single page.
///
/// Stored inside [`crate::output::PageResult`] when a page fails. Processing
/// of the containing document always continues with the next page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page could not be rasterised (bad page index, corrupt source,
    /// undecodable image, or encoding of the raster failed).
    #[error("page {page}: rasterisation failed: {detail}")]
    Render { page: usize, detail: String },

    /// The inference backend raised for this page. Not retried.
    #[error("page {page}: inference failed: {detail}")]
    Inference { page: usize, detail: String },
}

impl PageError {
    /// The 1-indexed page this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::Render { page, .. } | PageError::Inference { page, .. } => *page,
        }
    }
}
