//! # docs2md
//!
//! Batch-convert PDF documents and scanned images to Markdown with a vision
//! language model.
//!
//! ## Why this crate?
//!
//! Traditional PDF-to-text tools (pdftotext, pdf-extract) fail on complex
//! layouts — multi-column text, mathematical symbols, and tables come out
//! garbled or out of reading order, and scanned pages yield nothing at all.
//! Instead this crate rasterises each page into a PNG and lets a VLM read it
//! as a human would, producing one Markdown artifact per input document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! --pdfs glob
//!  │
//!  ├─ 1. Discover   expand the selector; keep PDFs + PNG/JPEG images
//!  ├─ 2. Render     rasterise one page, longest side bounded (pdfium)
//!  ├─ 3. Encode     PNG → base64 payload
//!  ├─ 4. Transcribe one blocking VLM call per page, no retries
//!  ├─ 5. Normalize  strip front matter + fence markers, trim
//!  └─ 6. Assemble   merge successful pages → {workspace}/{stem}.md
//! ```
//!
//! Pages are processed strictly sequentially — one page in flight across the
//! whole run — because the backend holds exclusive accelerator memory. A
//! page failure is contained to that page; a document with at least one
//! successful page still produces an artifact.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docs2md::{run, PipelineConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = PipelineConfig::builder()
//!         .pattern("scans/*.pdf")
//!         .workspace("./workspace")
//!         .build()?;
//!     let summary = run(&config).await?;
//!     eprintln!(
//!         "{}/{} documents converted",
//!         summary.documents_converted, summary.documents_discovered
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docs2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docs2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod rewrite;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{resolve_backend, LlmBackend, VisionBackend};
pub use config::{PipelineConfig, PipelineConfigBuilder, SamplingConfig};
pub use error::{ExtractError, PageError};
pub use output::{DocumentSummary, PageOutcome, PageResult, RunSummary};
pub use pipeline::discover::{Document, DocumentKind};
pub use progress::{NoopProgress, PipelineProgress, ProgressHandle};
pub use rewrite::MathStyle;
pub use run::run;
