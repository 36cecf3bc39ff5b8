//! Configuration types for a batch extraction run.
//!
//! All behaviour is controlled through [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across the run, log it, and diff two runs to
//! understand why their outputs differ.

use crate::backend::VisionBackend;
use crate::error::ExtractError;
use crate::progress::PipelineProgress;
use crate::rewrite::MathStyle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Sampling policy passed to the inference backend on every page call.
///
/// Fixed for the whole run: low temperature keeps the model faithful to what
/// is on the page, and the new-token budget bounds both cost and latency for
/// dense pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,
    /// Maximum tokens the backend may generate per page. Default: 2048.
    pub max_new_tokens: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_new_tokens: 2048,
        }
    }
}

/// Configuration for a batch extraction run.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use docs2md::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .pattern("scans/*.pdf")
///     .workspace("./out")
///     .target_longest_image_dim(1024)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Output directory for assembled artifacts. Created if absent.
    /// Default: `./workspace`.
    pub workspace: PathBuf,

    /// Glob selector for input documents (PDFs and PNG/JPEG images).
    /// Required; validated non-empty by the builder.
    pub pattern: String,

    /// Target for the longer raster dimension when rendering a PDF page, in
    /// pixels. Default: 1024.
    ///
    /// The page is scaled so that max(width, height) equals this value with
    /// aspect ratio preserved. 1024 px keeps text legible for the model while
    /// the encoded payload stays small. Standalone images are passed through
    /// untouched.
    pub target_longest_image_dim: u32,

    /// Sampling policy for every backend call.
    pub sampling: SamplingConfig,

    /// Backend model identifier, e.g. "gpt-4.1-nano". If None, the provider
    /// default is used.
    pub model: Option<String>,

    /// Backend provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `backend`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed backend handle. Takes precedence over
    /// `provider_name`; the seam tests use to inject a scripted backend.
    pub backend: Option<Arc<dyn VisionBackend>>,

    /// Custom page instruction. If None, uses [`crate::prompts::PAGE_PROMPT`].
    pub prompt: Option<String>,

    /// Math-delimiter rewrite applied to each assembled artifact.
    /// Default: [`MathStyle::Preserve`] (no rewrite).
    pub math_style: MathStyle,

    /// Optional progress observer for run/document/page events.
    pub progress: Option<Arc<dyn PipelineProgress>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("./workspace"),
            pattern: String::new(),
            target_longest_image_dim: 1024,
            sampling: SamplingConfig::default(),
            model: None,
            provider_name: None,
            backend: None,
            prompt: None,
            math_style: MathStyle::Preserve,
            progress: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("workspace", &self.workspace)
            .field("pattern", &self.pattern)
            .field("target_longest_image_dim", &self.target_longest_image_dim)
            .field("sampling", &self.sampling)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn VisionBackend>"))
            .field("math_style", &self.math_style)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn workspace(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.workspace = path.into();
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    pub fn target_longest_image_dim(mut self, px: u32) -> Self {
        self.config.target_longest_image_dim = px.max(100);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.sampling.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_new_tokens(mut self, n: usize) -> Self {
        self.config.sampling.max_new_tokens = n.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn VisionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn math_style(mut self, style: MathStyle) -> Self {
        self.config.math_style = style;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn PipelineProgress>) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ExtractError> {
        let c = &self.config;
        if c.pattern.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "input selector must not be empty".into(),
            ));
        }
        if c.target_longest_image_dim < 100 {
            return Err(ExtractError::InvalidConfig(format!(
                "target_longest_image_dim must be >= 100, got {}",
                c.target_longest_image_dim
            )));
        }
        Ok(self.config)
    }
}
