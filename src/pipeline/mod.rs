//! Pipeline stages for batch document extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. the rendering backend) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ render ──▶ encode ──▶ page ──▶ assemble
//! (glob)      (pdfium/    (base64)  (backend   (merge +
//!              image)               + normalize) write)
//! ```
//!
//! 1. [`discover`]  — expand the selector glob; classify PDFs vs images
//! 2. [`render`]    — rasterise one page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]    — PNG-encode and base64-wrap the raster for the
//!    multimodal request body
//! 4. [`page`]      — drive one backend call and normalise the response;
//!    the failure-isolation and buffer-reclamation boundary
//! 5. [`normalize`] — pure cleanup of generation scaffolding (front matter,
//!    fence markers)
//! 6. [`assemble`]  — merge successful pages into the per-document artifact

pub mod assemble;
pub mod discover;
pub mod encode;
pub mod normalize;
pub mod page;
pub mod render;
