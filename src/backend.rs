//! Inference backend: the narrow seam between the pipeline and the model.
//!
//! The pipeline only ever needs one call per page — an instruction, one
//! image, a fixed sampling policy, generated text back. [`VisionBackend`]
//! captures exactly that contract so the production provider can be swapped
//! for a scripted double in tests without touching the pipeline.
//!
//! The backend is resolved **once** per run, before any document is
//! processed, and the handle is passed into the page processor. There is no
//! hidden global and no mid-run reload.
//!
//! A failed call is opaque to the pipeline and is **not retried**: the page
//! is marked failed and the document moves on. The backend host holds scarce
//! accelerator memory, and a page that failed once under this sampling
//! policy will fail again.

use crate::config::{PipelineConfig, SamplingConfig};
use crate::error::ExtractError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// One page-transcription call against a vision language model.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Transcribe a single page image under the given sampling policy.
    ///
    /// Returns the raw generated text; callers normalise it. Errors are
    /// opaque faults of the backend and are never retried.
    async fn transcribe(
        &self,
        prompt: &str,
        image: ImageData,
        sampling: &SamplingConfig,
    ) -> Result<String, ExtractError>;
}

/// Production backend over an `edgequake-llm` provider.
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
}

impl LlmBackend {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl VisionBackend for LlmBackend {
    /// ## Message layout
    ///
    /// 1. **System message** — the fixed page instruction
    /// 2. **User message** — the page PNG as a base64 image attachment with
    ///    empty text: VLM APIs require at least one user turn to respond to,
    ///    but the image carries all the actual content.
    async fn transcribe(
        &self,
        prompt: &str,
        image: ImageData,
        sampling: &SamplingConfig,
    ) -> Result<String, ExtractError> {
        let messages = vec![
            ChatMessage::system(prompt),
            ChatMessage::user_with_images("", vec![image]),
        ];

        let options = CompletionOptions {
            temperature: Some(sampling.temperature),
            max_tokens: Some(sampling.max_new_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| ExtractError::Inference {
                detail: e.to_string(),
            })?;

        debug!(
            "backend call: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        Ok(response.content)
    }
}

/// Resolve the backend handle, from most-specific to least-specific.
///
/// 1. **Pre-built backend** (`config.backend`) — the caller constructed the
///    handle entirely; used as-is. This is also the test seam.
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key from the environment.
/// 3. **Environment pair** (`DOCS2MD_PROVIDER` + `DOCS2MD_MODEL`) — a
///    provider and model chosen at the execution-environment level
///    (Makefile, shell script, CI).
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — scans known
///    API key variables and picks the first available provider, preferring
///    OpenAI when multiple keys are present.
pub fn resolve_backend(config: &PipelineConfig) -> Result<Arc<dyn VisionBackend>, ExtractError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return create_vision_backend(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("DOCS2MD_PROVIDER"),
        std::env::var("DOCS2MD_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_backend(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
            return create_vision_backend("openai", model);
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ExtractError::BackendNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No vision provider could be auto-detected from the environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(Arc::new(LlmBackend::new(provider)))
}

/// Instantiate a named provider with the given model.
fn create_vision_backend(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn VisionBackend>, ExtractError> {
    let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ExtractError::BackendNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok(Arc::new(LlmBackend::new(provider)))
}
