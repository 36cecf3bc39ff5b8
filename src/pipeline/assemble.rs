//! Document assembly: merge successful page texts into one artifact.
//!
//! Assembly is purely mechanical — page texts are already final (the
//! normaliser ran inside the page processor and is never re-applied here).
//! The only transformation this stage may add is the configured
//! math-delimiter rewrite, which operates on the joined document text.

use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::output::PageResult;
use crate::pipeline::discover::Document;
use crate::rewrite;
use std::path::PathBuf;
use tracing::{debug, info};

/// Separator between page segments in the artifact.
const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Assemble a document's successful pages and write the artifact.
///
/// - Keeps successes in page order (guaranteed by sequential processing —
///   results are not re-sorted).
/// - Prefixes `## Page {n}` to each segment when the document has more than
///   one page; single-page documents get no header.
/// - Joins segments with `"\n\n---\n\n"` and writes
///   `{workspace}/{base_name}.md`, overwriting any existing artifact.
/// - With zero successful pages, writes nothing and returns `Ok(None)`.
pub async fn assemble(
    document: &Document,
    results: &[PageResult],
    config: &PipelineConfig,
) -> Result<Option<PathBuf>, ExtractError> {
    let multipage = document.page_count > 1;

    let segments: Vec<String> = results
        .iter()
        .filter_map(|r| {
            r.text().map(|text| {
                if multipage {
                    format!("## Page {}\n\n{}", r.page_number, text)
                } else {
                    text.to_string()
                }
            })
        })
        .collect();

    if segments.is_empty() {
        debug!("{}: no successful pages, no artifact written", document.name());
        return Ok(None);
    }

    let body = rewrite::apply(config.math_style, &segments.join(PAGE_SEPARATOR));

    let artifact_path = config.workspace.join(format!("{}.md", document.base_name));
    write_atomic(&artifact_path, &body).await?;

    info!(
        "{}: wrote {} of {} pages → {}",
        document.name(),
        segments.len(),
        document.page_count,
        artifact_path.display()
    );

    Ok(Some(artifact_path))
}

/// Write via a temp file and rename so a crash never leaves a partial
/// artifact at the final path.
async fn write_atomic(path: &PathBuf, body: &str) -> Result<(), ExtractError> {
    let write_err = |source: std::io::Error| ExtractError::ArtifactWrite {
        path: path.clone(),
        source,
    };

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, body).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
