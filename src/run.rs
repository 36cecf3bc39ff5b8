//! Batch orchestration: the per-document, per-page control loop.
//!
//! ## Scheduling model
//!
//! Strictly sequential: one page in flight at any time, across the entire
//! run. The inference backend holds exclusive, scarce accelerator memory,
//! and concurrent pages would risk contention or out-of-memory failure on
//! its host. Memory stays bounded through the per-page buffer release in
//! the page processor, not through queuing.
//!
//! ## Ordering guarantees
//!
//! Pages within a document are processed in strictly increasing page-number
//! order; documents in discovery order; document D's artifact is fully
//! written before D+1 begins.

use crate::backend;
use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::output::{DocumentSummary, RunSummary};
use crate::pipeline::{assemble, discover, page};
use tracing::{info, warn};

/// Run the extraction batch described by `config`.
///
/// Returns `Ok(RunSummary)` whenever the run executed, regardless of how
/// many pages or documents failed — per-page failures are contained in the
/// page processor, and unopenable or unwritable documents are logged and
/// skipped. The error cases are the ones that prevent execution entirely:
/// an invalid or unmatched selector, an uncreatable workspace, or an
/// unconfigured backend.
pub async fn run(config: &PipelineConfig) -> Result<RunSummary, ExtractError> {
    info!("starting extraction run: {}", config.pattern);

    tokio::fs::create_dir_all(&config.workspace)
        .await
        .map_err(|source| ExtractError::Workspace {
            path: config.workspace.clone(),
            source,
        })?;

    let inputs = discover::discover(&config.pattern)?;
    info!("discovered {} input documents", inputs.len());

    // One backend for the whole run, resolved before any document.
    let backend = backend::resolve_backend(config)?;

    if let Some(ref progress) = config.progress {
        progress.on_run_start(inputs.len());
    }

    let mut summary = RunSummary {
        documents_discovered: inputs.len(),
        ..RunSummary::default()
    };

    for (index, input) in inputs.iter().enumerate() {
        let document = match discover::open_document(input).await {
            Ok(d) => d,
            Err(e) => {
                warn!("skipping document: {e}");
                if let Some(ref progress) = config.progress {
                    progress.on_document_skipped(
                        index,
                        &input.path.display().to_string(),
                        &e.to_string(),
                    );
                }
                summary.documents_skipped += 1;
                continue;
            }
        };

        if let Some(ref progress) = config.progress {
            progress.on_document_start(index, &document.name(), document.page_count);
        }

        let mut results = Vec::with_capacity(document.page_count);
        for page_number in 1..=document.page_count {
            if let Some(ref progress) = config.progress {
                progress.on_page_start(page_number, document.page_count);
            }

            let result =
                page::process_page(backend.as_ref(), &document, page_number, config).await;

            if let Some(ref progress) = config.progress {
                match result.text() {
                    Some(text) => {
                        progress.on_page_done(page_number, document.page_count, text.len())
                    }
                    None => progress.on_page_failed(
                        page_number,
                        document.page_count,
                        &result
                            .error()
                            .map(|e| e.to_string())
                            .unwrap_or_else(|| "unknown error".into()),
                    ),
                }
            }

            results.push(result);
        }

        // A write failure costs this document's artifact, never the batch.
        let artifact = match assemble::assemble(&document, &results, config).await {
            Ok(a) => a,
            Err(e) => {
                warn!("{e}");
                None
            }
        };

        if let Some(ref progress) = config.progress {
            progress.on_document_done(index, &document.name(), artifact.as_deref());
        }

        let pages_succeeded = results.iter().filter(|r| r.is_success()).count();
        summary.pages_succeeded += pages_succeeded;
        summary.pages_failed += results.len() - pages_succeeded;
        if artifact.is_some() {
            summary.documents_converted += 1;
        }
        summary.documents.push(DocumentSummary {
            path: document.path.clone(),
            base_name: document.base_name.clone(),
            page_count: document.page_count,
            pages_succeeded,
            pages_failed: results.len() - pages_succeeded,
            artifact,
        });
    }

    info!(
        "run complete: {}/{} documents converted, {} pages ok, {} pages failed",
        summary.documents_converted,
        summary.documents_discovered,
        summary.pages_succeeded,
        summary.pages_failed
    );

    Ok(summary)
}
