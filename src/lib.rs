//! # Scholar - research assistant agents over a hosted LLM
//!
//! Scholar bundles five small research workflows behind one CLI and one
//! HTTP API:
//!
//! 1. **PDF summaries** with retrieval-augmented generation
//! 2. **Transcript summaries** for YouTube videos or saved transcripts
//! 3. **Paper debates** between a critical and a supporting agent
//! 4. **Knowledge graphs** extracted from a paper and rendered as HTML
//! 5. **Research digests** of recent arXiv, Semantic Scholar and PubMed papers
//!
//! ## Library usage
//!
//! ```rust,ignore
//! use scholar::{Provider, LLMClient};
//! use scholar::utils::toml_config::ScholarConfig;
//!
//! #[tokio::main]
//! async fn main() -> scholar::Result<()> {
//!     let config = ScholarConfig::load("scholar.toml")?;
//!     let provider = Provider::from_config(&config.llm)?;
//!     let client = provider.create_client().await?;
//!     println!("{}", client.generate("What is a transformer?").await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints |
//! | `local-embeddings` | fastembed ONNX embeddings instead of Gemini |
//!
//! ## Modules
//!
//! - [`api`] - axum router, handlers and OpenAPI document
//! - [`cli`] - clap definitions and terminal output
//! - [`debate`] - two-agent paper debate
//! - [`documents`] - PDF text extraction and download
//! - [`feeds`] - research feeds and the paper digest
//! - [`graph`] - knowledge-graph extraction and rendering
//! - [`llm`] - LLM client trait and providers
//! - [`rag`] - chunking, embeddings, retrieval and the PDF summarizer
//! - [`transcript`] - video transcripts and their summaries
//! - [`types`] - shared request/response types and errors
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Two-agent paper debate.
pub mod debate;
/// PDF extraction and download.
pub mod documents;
/// Research feeds and digests.
pub mod feeds;
/// Knowledge graphs.
pub mod graph;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Video transcripts.
pub mod transcript;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use llm::{LLMClient, Provider};
pub use rag::{Embedder, SummaryCache};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, ScholarConfig};

use crate::graph::KnowledgeGraph;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// The most recent graph built through the API.
#[derive(Debug, Clone)]
pub struct StoredGraph {
    pub filename: String,
    pub graph: KnowledgeGraph,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Text generation client for the configured provider
    pub llm: Arc<dyn LLMClient>,
    /// Embedding provider for RAG
    pub embedder: Arc<dyn Embedder>,
    /// Shared HTTP client for downloads and feeds
    pub http: reqwest::Client,
    /// Finished PDF summaries keyed by document hash
    pub summary_cache: Arc<SummaryCache>,
    /// Last knowledge graph built by `POST /api/knowledge-graph`
    pub latest_graph: Arc<RwLock<Option<StoredGraph>>>,
}

impl AppState {
    /// Assemble state from already-built clients.
    pub fn new(
        config_manager: Arc<ConfigManager>,
        llm: Arc<dyn LLMClient>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let config = config_manager.config();
        let http = build_http_client(config.llm.timeout_secs)?;
        let summary_cache = Arc::new(SummaryCache::new(config.rag.cache_capacity));

        Ok(Self {
            config_manager,
            llm,
            embedder,
            http,
            summary_cache,
            latest_graph: Arc::new(RwLock::new(None)),
        })
    }

    /// Build the LLM client and embedder named in the configuration.
    pub async fn from_config(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = config_manager.config();

        let provider = Provider::from_config(&config.llm)?;
        let llm: Arc<dyn LLMClient> = Arc::from(provider.create_client().await?);

        // Gemini embeddings share the generation key and endpoint
        let api_key = config.resolve_env(&config.llm.api_key_env);
        let base_url = if config.llm.provider == "gemini" {
            config.llm.base_url.as_deref()
        } else {
            None
        };
        let embedder = rag::create_embedder(&config.embeddings, api_key.as_deref(), base_url)?;

        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            embeddings = embedder.model_name(),
            "Clients ready"
        );

        Self::new(config_manager, llm, embedder)
    }
}

/// reqwest client used for PDF downloads, feeds and transcripts.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("scholar/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}
