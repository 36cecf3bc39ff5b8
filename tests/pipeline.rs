//! Integration tests for the batch extraction pipeline.
//!
//! These drive the full run — discovery, rendering, backend call,
//! normalisation, assembly — against real image files in a temp directory
//! and a scripted in-process backend, so they exercise every seam without
//! network access or a pdfium install.

use async_trait::async_trait;
use docs2md::{
    run, ExtractError, MathStyle, PipelineConfig, SamplingConfig, VisionBackend,
};
use edgequake_llm::ImageData;
use image::{Rgb, RgbImage};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test doubles and helpers ─────────────────────────────────────────────────

/// Backend double that pops scripted responses in call order and records
/// the prompt of every call it receives.
struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts_seen: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts_seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts_seen.lock().unwrap().len()
    }
}

#[async_trait]
impl VisionBackend for ScriptedBackend {
    async fn transcribe(
        &self,
        prompt: &str,
        image: ImageData,
        _sampling: &SamplingConfig,
    ) -> Result<String, ExtractError> {
        assert_eq!(image.mime_type, "image/png", "pages travel as PNG");
        self.prompts_seen.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("backend called more times than scripted")
            .map_err(|detail| ExtractError::Inference { detail })
    }
}

/// Write a decodable PNG input file.
fn write_png(dir: &Path, name: &str) {
    RgbImage::from_pixel(24, 16, Rgb([200, 200, 200]))
        .save(dir.join(name))
        .unwrap();
}

fn config(
    inputs: &TempDir,
    workspace: &TempDir,
    backend: Arc<ScriptedBackend>,
) -> PipelineConfig {
    PipelineConfig::builder()
        .pattern(format!("{}/*.png", inputs.path().display()))
        .workspace(workspace.path())
        .backend(backend)
        .build()
        .unwrap()
}

fn artifact(workspace: &TempDir, stem: &str) -> Option<String> {
    std::fs::read_to_string(workspace.path().join(format!("{stem}.md"))).ok()
}

// ── Single-document scenarios ────────────────────────────────────────────────

#[tokio::test]
async fn fenced_backend_output_becomes_plain_artifact() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_png(inputs.path(), "note.png");

    let backend = ScriptedBackend::new(vec![Ok("```markdown\nWorld\n```".into())]);
    let summary = run(&config(&inputs, &workspace, backend)).await.unwrap();

    // Single-page document: no page header, scaffolding stripped.
    assert_eq!(artifact(&workspace, "note").as_deref(), Some("World"));
    assert_eq!(summary.documents_converted, 1);
    assert_eq!(summary.pages_succeeded, 1);
}

#[tokio::test]
async fn front_matter_is_stripped_before_assembly() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_png(inputs.path(), "memo.png");

    let backend = ScriptedBackend::new(vec![Ok("---\nprimary_language: en\n---\nHello".into())]);
    run(&config(&inputs, &workspace, backend)).await.unwrap();

    assert_eq!(artifact(&workspace, "memo").as_deref(), Some("Hello"));
}

#[tokio::test]
async fn all_pages_failed_writes_no_artifact() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_png(inputs.path(), "scan.png");

    let backend = ScriptedBackend::new(vec![Err("accelerator out of memory".into())]);
    let summary = run(&config(&inputs, &workspace, backend)).await.unwrap();

    assert!(artifact(&workspace, "scan").is_none());
    assert_eq!(summary.documents_converted, 0);
    assert_eq!(summary.pages_failed, 1);
    // A page failure never fails the run.
    assert_eq!(summary.documents_discovered, 1);
}

// ── Batch scenarios ──────────────────────────────────────────────────────────

#[tokio::test]
async fn documents_process_in_discovery_order() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_png(inputs.path(), "a.png");
    write_png(inputs.path(), "b.png");
    write_png(inputs.path(), "c.png");

    let backend = ScriptedBackend::new(vec![
        Ok("first".into()),
        Ok("second".into()),
        Ok("third".into()),
    ]);
    let summary = run(&config(&inputs, &workspace, backend.clone()))
        .await
        .unwrap();

    // Glob order is alphabetical, and responses pop in call order, so the
    // contents prove the sequencing.
    assert_eq!(artifact(&workspace, "a").as_deref(), Some("first"));
    assert_eq!(artifact(&workspace, "b").as_deref(), Some("second"));
    assert_eq!(artifact(&workspace, "c").as_deref(), Some("third"));
    assert_eq!(backend.calls(), 3);
    assert_eq!(summary.documents_converted, 3);
}

#[tokio::test]
async fn one_failing_document_does_not_stop_the_batch() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_png(inputs.path(), "a.png");
    write_png(inputs.path(), "b.png");
    write_png(inputs.path(), "c.png");

    let backend = ScriptedBackend::new(vec![
        Ok("alpha".into()),
        Err("backend raised".into()),
        Ok("gamma".into()),
    ]);
    let summary = run(&config(&inputs, &workspace, backend)).await.unwrap();

    assert_eq!(artifact(&workspace, "a").as_deref(), Some("alpha"));
    assert!(artifact(&workspace, "b").is_none());
    assert_eq!(artifact(&workspace, "c").as_deref(), Some("gamma"));
    assert_eq!(summary.documents_converted, 2);
    assert_eq!(summary.pages_failed, 1);

    let failed_doc = summary
        .documents
        .iter()
        .find(|d| d.base_name == "b")
        .unwrap();
    assert!(failed_doc.artifact.is_none());
    assert_eq!(failed_doc.pages_failed, 1);
}

#[tokio::test]
async fn unmatched_selector_ends_the_run() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let backend = ScriptedBackend::new(vec![]);
    let err = run(&config(&inputs, &workspace, backend.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::NoInputsMatched { .. }));
    assert_eq!(backend.calls(), 0, "backend must not be called");
}

#[tokio::test]
async fn workspace_directory_is_created() {
    let inputs = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    write_png(inputs.path(), "doc.png");

    let backend = ScriptedBackend::new(vec![Ok("content".into())]);
    let workspace = root.path().join("nested/out");
    let config = PipelineConfig::builder()
        .pattern(format!("{}/*.png", inputs.path().display()))
        .workspace(&workspace)
        .backend(backend)
        .build()
        .unwrap();

    run(&config).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(workspace.join("doc.md")).unwrap(),
        "content"
    );
}

// ── Configuration seams ──────────────────────────────────────────────────────

#[tokio::test]
async fn custom_prompt_reaches_the_backend() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_png(inputs.path(), "doc.png");

    let backend = ScriptedBackend::new(vec![Ok("ok".into())]);
    let config = PipelineConfig::builder()
        .pattern(format!("{}/*.png", inputs.path().display()))
        .workspace(workspace.path())
        .backend(backend.clone())
        .prompt("Transcribe faithfully.")
        .build()
        .unwrap();

    run(&config).await.unwrap();
    assert_eq!(
        backend.prompts_seen.lock().unwrap().as_slice(),
        ["Transcribe faithfully."]
    );
}

#[tokio::test]
async fn math_style_rewrites_the_assembled_artifact() {
    let inputs = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_png(inputs.path(), "paper.png");

    let backend = ScriptedBackend::new(vec![Ok(r"Euler: \( e^{i\pi} = -1 \)".into())]);
    let config = PipelineConfig::builder()
        .pattern(format!("{}/*.png", inputs.path().display()))
        .workspace(workspace.path())
        .backend(backend)
        .math_style(MathStyle::Obsidian)
        .build()
        .unwrap();

    run(&config).await.unwrap();
    assert_eq!(
        artifact(&workspace, "paper").as_deref(),
        Some(r"Euler: $e^{i\pi} = -1$")
    );
}
