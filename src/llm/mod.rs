//! LLM Provider Clients and Abstractions
//!
//! Every pipeline in the crate talks to a model through the [`LLMClient`]
//! trait, so the provider can be switched in `scholar.toml` without touching
//! the pipelines.
//!
//! # Supported Providers
//!
//! - Gemini (always built, plain HTTP)
//! - `openai` - OpenAI API and compatible endpoints
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use scholar::llm::{LLMClient, Provider};
//!
//! let provider = Provider::from_config(&config.llm)?;
//! let client = provider.create_client().await?;
//!
//! let summary = client.generate("Summarize attention in one line").await?;
//! ```

/// Core LLM client trait, request types and provider selection.
pub mod client;
/// Google Gemini REST client.
pub mod gemini;
/// Parsing JSON out of model replies.
pub mod structured;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{CompletionRequest, GenerationParams, LLMClient, Provider};
