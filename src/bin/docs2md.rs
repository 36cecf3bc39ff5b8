//! CLI binary for docs2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` and renders progress and the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use docs2md::{run, MathStyle, PipelineConfig, PipelineProgress, ProgressHandle, RunSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress using indicatif ─────────────────────────────────────────────

/// Terminal progress: one bar over the document batch, per-page log lines
/// above it. Pages always complete in order (the pipeline is sequential),
/// so the lines read as a running transcript of the batch.
struct CliProgress {
    bar: ProgressBar,
    page_failures: AtomicUsize,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:40.green/238}] {pos}/{len} documents  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_failures: AtomicUsize::new(0),
        })
    }
}

impl PipelineProgress for CliProgress {
    fn on_run_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, index: usize, name: &str, page_count: usize) {
        self.bar.set_message(name.to_string());
        self.bar.println(format!(
            "{} {}  {}",
            bold(&format!("▸ {}", name)),
            dim(&format!("#{}", index + 1)),
            dim(&format!("{page_count} pages")),
        ));
    }

    fn on_document_skipped(&self, _index: usize, name: &str, reason: &str) {
        self.bar
            .println(format!("{} {}  {}", yellow("↷"), name, dim(reason)));
        self.bar.inc(1);
    }

    fn on_page_done(&self, page_number: usize, page_count: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} page {:>3}/{:<3}  {}",
            green("✓"),
            page_number,
            page_count,
            dim(&format!("{text_len:>5} chars")),
        ));
    }

    fn on_page_failed(&self, page_number: usize, page_count: usize, error: &str) {
        self.page_failures.fetch_add(1, Ordering::SeqCst);
        // Truncate very long error messages to keep the transcript tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} page {:>3}/{:<3}  {}",
            red("✗"),
            page_number,
            page_count,
            red(&msg),
        ));
    }

    fn on_document_done(&self, _index: usize, name: &str, artifact: Option<&Path>) {
        match artifact {
            Some(path) => self.bar.println(format!(
                "  {} {}",
                green("→"),
                bold(&path.display().to_string())
            )),
            None => self
                .bar
                .println(format!("  {} {} produced no artifact", red("∅"), name)),
        }
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r###"EXAMPLES:
  # Convert every PDF in a directory
  docs2md --pdfs 'scans/*.pdf'

  # Mixed PDFs and images, custom output directory
  docs2md --pdfs 'inbox/*' --workspace ./notes

  # Smaller page rasters for a cheaper model
  docs2md --pdfs 'book.pdf' --target_longest_image_dim 768

  # Obsidian-style math delimiters in the artifacts
  docs2md --pdfs 'papers/*.pdf' --math-style obsidian

  # Specific provider and model
  docs2md --pdfs 'doc.pdf' --provider openai --model gpt-4.1-nano

  # Machine-readable run summary
  docs2md --pdfs 'scans/*.pdf' --json > summary.json

OUTPUT:
  One Markdown file per input document that had at least one successful
  page, at {workspace}/{input stem}.md. Multi-page documents get a
  "## Page N" header per segment; segments are separated by a horizontal
  rule. A document whose every page failed produces no file.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY      OpenAI API key
  ANTHROPIC_API_KEY   Anthropic API key
  GEMINI_API_KEY      Google Gemini API key
  DOCS2MD_PROVIDER    Override provider (openai, anthropic, gemini, ollama)
  DOCS2MD_MODEL       Override model ID
  PDFIUM_LIB_PATH     Path to an existing libpdfium
"###;

/// Convert batches of PDFs and scanned images to Markdown using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "docs2md",
    version,
    about = "Batch-convert PDFs and scanned images to Markdown using Vision LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Glob selector for input PDFs and PNG/JPEG images.
    #[arg(long, env = "DOCS2MD_PDFS")]
    pdfs: String,

    /// Output directory for the Markdown artifacts (created if absent).
    #[arg(long, env = "DOCS2MD_WORKSPACE", default_value = "./workspace")]
    workspace: PathBuf,

    /// Target for the longer raster dimension of a rendered PDF page, px.
    #[arg(
        long = "target_longest_image_dim",
        env = "DOCS2MD_TARGET_LONGEST_IMAGE_DIM",
        default_value_t = 1024
    )]
    target_longest_image_dim: u32,

    /// Backend model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "DOCS2MD_MODEL")]
    model: Option<String>,

    /// Backend provider: openai, anthropic, gemini, ollama, azure.
    /// Auto-detected from API key env vars if not set.
    #[arg(long, env = "DOCS2MD_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "DOCS2MD_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max tokens the backend may generate per page.
    #[arg(long, env = "DOCS2MD_MAX_NEW_TOKENS", default_value_t = 2048)]
    max_new_tokens: usize,

    /// Math delimiter style for artifacts: preserve, latex, obsidian.
    #[arg(long, env = "DOCS2MD_MATH_STYLE", value_enum, default_value = "preserve")]
    math_style: MathStyleArg,

    /// Path to a text file containing a custom page instruction.
    #[arg(long, env = "DOCS2MD_PROMPT")]
    prompt: Option<PathBuf>,

    /// Print the run summary as JSON instead of the human-readable report.
    #[arg(long, env = "DOCS2MD_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "DOCS2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCS2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCS2MD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum MathStyleArg {
    Preserve,
    Latex,
    Obsidian,
}

impl From<MathStyleArg> for MathStyle {
    fn from(v: MathStyleArg) -> Self {
        match v {
            MathStyleArg::Preserve => MathStyle::Preserve,
            MathStyleArg::Latex => MathStyle::Latex,
            MathStyleArg::Obsidian => MathStyle::Obsidian,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress transcript is
    // active; it already shows everything that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let cli_progress: Option<Arc<CliProgress>> = if show_progress {
        Some(CliProgress::new())
    } else {
        None
    };
    let progress = cli_progress.clone().map(|p| p as ProgressHandle);

    let config = build_config(&cli, progress).await?;

    // ── Run the batch ────────────────────────────────────────────────────
    let summary = run(&config).await.context("extraction run failed")?;

    if let Some(p) = cli_progress {
        p.bar.finish_and_clear();
    }

    report(&cli, &summary)?;
    Ok(())
}

/// Map CLI args to `PipelineConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressHandle>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .pattern(&cli.pdfs)
        .workspace(&cli.workspace)
        .target_longest_image_dim(cli.target_longest_image_dim)
        .temperature(cli.temperature)
        .max_new_tokens(cli.max_new_tokens)
        .math_style(cli.math_style.clone().into());

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref path) = cli.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read page instruction from {path:?}"))?;
        builder = builder.prompt(prompt);
    }
    if let Some(p) = progress {
        builder = builder.progress(p);
    }

    builder.build().context("invalid configuration")
}

/// Render the end-of-run report.
fn report(cli: &Cli, summary: &RunSummary) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).context("failed to serialise run summary")?
        );
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    let all_converted = summary.documents_converted == summary.documents_discovered;
    eprintln!(
        "{} {}/{} documents converted  →  {}",
        if all_converted { green("✔") } else { yellow("⚠") },
        bold(&summary.documents_converted.to_string()),
        summary.documents_discovered,
        bold(&cli.workspace.display().to_string()),
    );
    eprintln!(
        "   {} pages ok  /  {} pages failed  /  {} documents skipped",
        dim(&summary.pages_succeeded.to_string()),
        dim(&summary.pages_failed.to_string()),
        dim(&summary.documents_skipped.to_string()),
    );

    Ok(())
}
