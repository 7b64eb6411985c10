//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface over the supported providers:
//! - **Gemini**: Google's Generative Language REST API (always available)
//! - **OpenAI**: OpenAI and compatible endpoints (feature `openai`)
//! - **Ollama**: Local inference through an Ollama server (feature `ollama`)

use crate::types::{AppError, ChatTurn, Result};
use crate::utils::toml_config::LlmConfig;
use async_trait::async_trait;

/// Sampling parameters for a single request. `None` leaves the provider's
/// default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationParams {
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_output_tokens: Some(max_output_tokens),
        }
    }

    /// The `[llm]` section's defaults
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            temperature: Some(config.temperature),
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Everything a provider needs to produce one completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub turns: Vec<ChatTurn>,
    pub params: GenerationParams,
}

impl CompletionRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            turns: vec![ChatTurn::user(prompt)],
            ..Default::default()
        }
    }
}

/// Generic LLM client trait for provider abstraction
///
/// Providers only implement [`LLMClient::complete`]; the convenience
/// methods all build a [`CompletionRequest`] and delegate to it.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Send a fully specified request
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(&CompletionRequest::from_prompt(prompt)).await
    }

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            system: Some(system.to_string()),
            ..CompletionRequest::from_prompt(prompt)
        };
        self.complete(&request).await
    }

    /// Generate with conversation history
    async fn generate_with_history(
        &self,
        system: Option<&str>,
        turns: &[ChatTurn],
    ) -> Result<String> {
        let request = CompletionRequest {
            system: system.map(str::to_string),
            turns: turns.to_vec(),
            params: GenerationParams::default(),
        };
        self.complete(&request).await
    }

    /// Generate with explicit sampling parameters
    async fn generate_with_params(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let request = CompletionRequest {
            params: *params,
            ..CompletionRequest::from_prompt(prompt)
        };
        self.complete(&request).await
    }

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini over the Generative Language REST API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: std::env::var("GOOGLE_API_KEY")?,
    ///     base_url: "https://generativelanguage.googleapis.com".to_string(),
    ///     model: "gemini-2.5-flash".to_string(),
    ///     timeout_secs: 120,
    /// };
    /// ```
    Gemini {
        api_key: String,
        base_url: String,
        model: String,
        timeout_secs: u64,
    },

    /// OpenAI API provider (including compatible APIs)
    #[cfg(feature = "openai")]
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    #[cfg(feature = "ollama")]
    Ollama { base_url: String, model: String },
}

pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";
#[cfg(feature = "openai")]
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
#[cfg(feature = "ollama")]
pub const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";

impl Provider {
    /// Build a provider from the `[llm]` config section, resolving the API
    /// key from the environment.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = || {
            std::env::var(&config.api_key_env).map_err(|_| {
                AppError::Config(format!(
                    "Environment variable '{}' is not set",
                    config.api_key_env
                ))
            })
        };

        match config.provider.as_str() {
            "gemini" => Ok(Provider::Gemini {
                api_key: api_key()?,
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE.to_string()),
                model: config.model.clone(),
                timeout_secs: config.timeout_secs,
            }),
            #[cfg(feature = "openai")]
            "openai" => Ok(Provider::OpenAI {
                api_key: api_key()?,
                api_base: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string()),
                model: config.model.clone(),
            }),
            #[cfg(feature = "ollama")]
            "ollama" => Ok(Provider::Ollama {
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_BASE.to_string()),
                model: config.model.clone(),
            }),
            other => Err(AppError::Config(format!(
                "LLM provider '{}' is unknown or not enabled in this build",
                other
            ))),
        }
    }

    /// Create a client instance for this provider
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::Gemini {
                api_key,
                base_url,
                model,
                timeout_secs,
            } => Ok(Box::new(super::gemini::GeminiClient::new(
                api_key,
                base_url.clone(),
                model.clone(),
                *timeout_secs,
            )?)),

            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()).await?,
            )),
        }
    }

    /// Whether the provider has the credentials it needs
    pub fn is_available(&self) -> bool {
        match self {
            Provider::Gemini { api_key, .. } => {
                !super::gemini::sanitize_api_key(api_key).is_empty()
            }
            #[cfg(feature = "openai")]
            Provider::OpenAI { api_key, .. } => !api_key.trim().is_empty(),
            #[cfg(feature = "ollama")]
            Provider::Ollama { .. } => true,
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
            #[cfg(feature = "openai")]
            Provider::OpenAI { .. } => "OpenAI",
            #[cfg(feature = "ollama")]
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini { model, .. } => model,
            #[cfg(feature = "openai")]
            Provider::OpenAI { model, .. } => model,
            #[cfg(feature = "ollama")]
            Provider::Ollama { model, .. } => model,
        }
    }
}
