//! Page processing: render → encode → transcribe → normalise, for one page.
//!
//! This is the pipeline's failure-isolation boundary. Every error raised by
//! any stage is converted here into a failure [`PageResult`] and logged;
//! nothing propagates, so the containing document always continues with the
//! next page number.
//!
//! It is also the reclamation boundary. The backend host runs on scarce
//! accelerator memory and a multi-page document would otherwise accumulate
//! a raster, an encoded payload, and a generation buffer per page. All
//! transient buffers are owned by a [`TransientBuffers`] guard that is
//! dropped when processing returns — success or failure — so peak host
//! memory is bounded to a single page by construction.

use crate::backend::VisionBackend;
use crate::config::PipelineConfig;
use crate::error::PageError;
use crate::output::PageResult;
use crate::pipeline::discover::{Document, DocumentKind};
use crate::pipeline::{encode, normalize, render};
use crate::prompts;
use edgequake_llm::ImageData;
use image::DynamicImage;
use tracing::{debug, warn};

/// Owner of one page's transient allocations.
///
/// Buffers are moved in as the stages produce them and released together
/// when the guard drops, on every exit path out of [`process_page`].
#[derive(Default)]
struct TransientBuffers {
    raster: Option<DynamicImage>,
    payload: Option<ImageData>,
    raw_text: Option<String>,
}

impl TransientBuffers {
    fn held_bytes(&self) -> usize {
        self.raster.as_ref().map_or(0, |r| r.as_bytes().len())
            + self.payload.as_ref().map_or(0, |p| p.data.len())
            + self.raw_text.as_ref().map_or(0, String::len)
    }
}

impl Drop for TransientBuffers {
    fn drop(&mut self) {
        let bytes = self.held_bytes();
        if bytes > 0 {
            debug!("released {bytes} bytes of page buffers");
        }
    }
}

/// Process one page of one document into a [`PageResult`].
///
/// Never returns an error: a failure in any stage yields the failure
/// variant, logged with the document and page it belongs to.
pub async fn process_page(
    backend: &dyn VisionBackend,
    document: &Document,
    page_number: usize,
    config: &PipelineConfig,
) -> PageResult {
    let mut scratch = TransientBuffers::default();

    match run_stages(backend, document, page_number, config, &mut scratch).await {
        Ok(text) => {
            debug!(
                "{} page {}/{}: {} chars",
                document.name(),
                page_number,
                document.page_count,
                text.len()
            );
            PageResult::success(page_number, text)
        }
        Err(error) => {
            warn!("{} page {}: {error}", document.name(), page_number);
            PageResult::failure(page_number, error)
        }
    }
    // `scratch` drops here on both paths, releasing the page's buffers.
}

async fn run_stages(
    backend: &dyn VisionBackend,
    document: &Document,
    page_number: usize,
    config: &PipelineConfig,
    scratch: &mut TransientBuffers,
) -> Result<String, PageError> {
    let raster = match document.kind {
        DocumentKind::Pdf => {
            render::render_pdf_page(&document.path, page_number, config.target_longest_image_dim)
                .await?
        }
        DocumentKind::Image => render::load_image(&document.path).await?,
    };

    let payload = encode::encode_raster(&raster).map_err(|e| PageError::Render {
        page: page_number,
        detail: format!("image encoding failed: {e}"),
    })?;
    scratch.raster = Some(raster);

    let prompt = config.prompt.as_deref().unwrap_or(prompts::PAGE_PROMPT);
    let raw = backend
        .transcribe(prompt, payload.clone(), &config.sampling)
        .await
        .map_err(|e| PageError::Inference {
            page: page_number,
            detail: e.to_string(),
        })?;
    scratch.payload = Some(payload);

    let text = normalize::normalize(&raw);
    scratch.raw_text = Some(raw);

    Ok(text)
}
