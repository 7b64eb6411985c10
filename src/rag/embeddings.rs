//! Text embedding providers for retrieval.

use crate::llm::gemini::sanitize_api_key;
use crate::types::{AppError, Result};
use crate::utils::toml_config::EmbeddingsConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed chunks for indexing.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str;
}

/// Build the embedder named in `[embeddings]`.
pub fn create_embedder(
    config: &EmbeddingsConfig,
    api_key: Option<&str>,
    base_url: Option<&str>,
) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "gemini" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("Gemini embeddings need an API key".to_string())
            })?;
            Ok(Arc::new(GeminiEmbedder::new(
                key,
                base_url.unwrap_or(crate::llm::client::DEFAULT_GEMINI_BASE),
                &config.model,
                config.batch_size,
            )?))
        }
        #[cfg(feature = "local-embeddings")]
        "local" => Ok(Arc::new(LocalEmbedder::new()?)),
        other => Err(AppError::Config(format!(
            "Embedding provider '{}' is unknown or not enabled in this build",
            other
        ))),
    }
}

// ============= Gemini =============

pub struct GeminiEmbedder {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    batch_size: usize,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: EmbedContent<'a>,
    task_type: &'static str,
}

#[derive(Serialize)]
struct EmbedContent<'a> {
    parts: [EmbedPart<'a>; 1],
}

#[derive(Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl GeminiEmbedder {
    pub fn new(api_key: &str, base_url: &str, model: &str, batch_size: usize) -> Result<Self> {
        let api_key = sanitize_api_key(api_key);
        if api_key.is_empty() {
            return Err(AppError::Config("Gemini API key is empty".to_string()));
        }
        let model = model.strip_prefix("models/").unwrap_or(model).to_string();

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            batch_size: batch_size.max(1),
        })
    }

    async fn embed_batch(&self, texts: &[String], task_type: &'static str) -> Result<Vec<Vec<f32>>> {
        let model_path = format!("models/{}", self.model);
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: &model_path,
                    content: EmbedContent {
                        parts: [EmbedPart { text }],
                    },
                    task_type,
                })
                .collect(),
        };

        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents",
            self.base_url, self.model
        );
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Gemini embedding error ({}): {}",
                status, text
            )));
        }

        let parsed: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid embedding response: {}", e)))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(AppError::LLM(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch, "RETRIEVAL_DOCUMENT").await?);
        }
        tracing::debug!(count = vectors.len(), model = %self.model, "Embedded documents");
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()], "RETRIEVAL_QUERY")
            .await?
            .pop()
            .ok_or_else(|| AppError::LLM("No embedding returned for query".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============= Local (fastembed) =============

#[cfg(feature = "local-embeddings")]
pub struct LocalEmbedder {
    model: Arc<parking_lot::Mutex<fastembed::TextEmbedding>>,
}

#[cfg(feature = "local-embeddings")]
impl LocalEmbedder {
    pub fn new() -> Result<Self> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(true),
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            model: Arc::new(parking_lot::Mutex::new(model)),
        })
    }

    async fn embed_owned(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            model
                .lock()
                .embed(texts, None)
                .map_err(|e| AppError::Internal(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_owned(texts.to_vec()).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_owned(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("No embedding returned for query".to_string()))
    }

    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }
}
