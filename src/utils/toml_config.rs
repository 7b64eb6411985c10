//! TOML-based configuration for scholar
//!
//! Every section and field has a serde default, so a missing or partial
//! `scholar.toml` still yields a complete configuration. Secrets never live
//! in the file: it names the environment variable that holds them.
//!
//! # Hot Reloading
//!
//! The HTTP server wraps the configuration in a [`ConfigManager`], which
//! watches the file and swaps in a new config when it changes.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use scholar_vector::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "scholar.toml";

/// Root configuration structure loaded from scholar.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScholarConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub debate: DebateConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub transcript: TranscriptConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upload limit for multipart endpoints, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_mb() -> usize {
    16
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_upload_mb: default_max_upload_mb(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// One of `gemini`, `openai`, `ollama`
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Override the provider's default endpoint
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    pub max_output_tokens: Option<u32>,
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: None,
        }
    }
}

// ============= Embeddings Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `gemini`, or `local` when built with `local-embeddings`
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Max texts per batchEmbedContents request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_embedding_provider() -> String {
    "gemini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            batch_size: default_batch_size(),
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default = "default_rag_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_rag_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Retrieved context is cut to this many characters before prompting
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    #[serde(default = "default_rag_temperature")]
    pub temperature: f32,

    #[serde(default = "default_rag_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Number of PDF summaries kept in memory. 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Similarity used to rank chunks: cosine, dot_product or euclidean
    #[serde(default)]
    pub metric: DistanceMetric,
}

fn default_rag_chunk_size() -> usize {
    1000
}

fn default_rag_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

fn default_max_context_chars() -> usize {
    8000
}

fn default_rag_temperature() -> f32 {
    0.3
}

fn default_rag_max_output_tokens() -> u32 {
    1024
}

fn default_cache_capacity() -> usize {
    32
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_rag_chunk_size(),
            chunk_overlap: default_rag_chunk_overlap(),
            top_k: default_top_k(),
            max_context_chars: default_max_context_chars(),
            temperature: default_rag_temperature(),
            max_output_tokens: default_rag_max_output_tokens(),
            cache_capacity: default_cache_capacity(),
            metric: DistanceMetric::default(),
        }
    }
}

// ============= Debate Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateConfig {
    #[serde(default = "default_points_per_side")]
    pub points_per_side: usize,

    /// Pause between point requests
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Terminal wrap width for the CLI transcript
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    /// Ask the model for a final verdict after both conclusions
    #[serde(default = "default_true")]
    pub judge: bool,
}

fn default_points_per_side() -> usize {
    5
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_wrap_width() -> usize {
    80
}

fn default_true() -> bool {
    true
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            points_per_side: default_points_per_side(),
            delay_ms: default_delay_ms(),
            wrap_width: default_wrap_width(),
            judge: true,
        }
    }
}

// ============= Knowledge Graph Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_graph_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Only chunks mentioning one of these are summarized. Empty keeps all.
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default = "default_graph_output")]
    pub output: PathBuf,
}

fn default_graph_chunk_size() -> usize {
    1000
}

fn default_graph_chunk_overlap() -> usize {
    50
}

fn default_graph_output() -> PathBuf {
    PathBuf::from("knowledge_graph.html")
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_graph_chunk_size(),
            chunk_overlap: default_graph_chunk_overlap(),
            keywords: Vec::new(),
            output: default_graph_output(),
        }
    }
}

// ============= Digest Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_digest_query")]
    pub query: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Papers published before now minus this many hours are dropped
    #[serde(default = "default_hours_back")]
    pub hours_back: i64,

    /// How many papers get a rewritten title
    #[serde(default = "default_catchy_titles")]
    pub catchy_titles: usize,

    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Any of `arxiv`, `semantic_scholar`, `pubmed`
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Override source endpoints, mostly for tests
    pub arxiv_url: Option<String>,
    pub semantic_scholar_url: Option<String>,
    pub pubmed_url: Option<String>,
}

fn default_digest_query() -> String {
    "transformer OR large language model OR neural networks OR deep learning OR attention mechanism OR GPT OR BERT OR machine learning".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_hours_back() -> i64 {
    300
}

fn default_catchy_titles() -> usize {
    10
}

fn default_preview_chars() -> usize {
    300
}

fn default_sources() -> Vec<String> {
    vec!["arxiv".to_string()]
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            query: default_digest_query(),
            max_results: default_max_results(),
            hours_back: default_hours_back(),
            catchy_titles: default_catchy_titles(),
            preview_chars: default_preview_chars(),
            sources: default_sources(),
            arxiv_url: None,
            semantic_scholar_url: None,
            pubmed_url: None,
        }
    }
}

// ============= Transcript Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Preferred caption languages, in order
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Override the YouTube origin, mostly for tests
    pub base_url: Option<String>,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            base_url: None,
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Unknown {kind} provider '{name}'")]
    UnknownProvider { kind: &'static str, name: String },

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

const LLM_PROVIDERS: &[&str] = &["gemini", "openai", "ollama"];
const EMBEDDING_PROVIDERS: &[&str] = &["gemini", "local"];
const FEED_SOURCES: &[&str] = &["arxiv", "semantic_scholar", "pubmed"];

impl ScholarConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "No configuration file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScholarConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate ranges and provider names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::UnknownProvider {
                kind: "llm",
                name: self.llm.provider.clone(),
            });
        }
        if !EMBEDDING_PROVIDERS.contains(&self.embeddings.provider.as_str()) {
            return Err(ConfigError::UnknownProvider {
                kind: "embeddings",
                name: self.embeddings.provider.clone(),
            });
        }
        for source in &self.digest.sources {
            if !FEED_SOURCES.contains(&source.as_str()) {
                return Err(ConfigError::UnknownProvider {
                    kind: "feed",
                    name: source.clone(),
                });
            }
        }

        check_chunking("rag", self.rag.chunk_size, self.rag.chunk_overlap)?;
        check_chunking("graph", self.graph.chunk_size, self.graph.chunk_overlap)?;

        if self.rag.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.top_k must be at least 1".to_string(),
            ));
        }
        if self.debate.points_per_side == 0 {
            return Err(ConfigError::ValidationError(
                "debate.points_per_side must be at least 1".to_string(),
            ));
        }
        if self.embeddings.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "embeddings.batch_size must be at least 1".to_string(),
            ));
        }
        if self.digest.hours_back <= 0 {
            return Err(ConfigError::ValidationError(
                "digest.hours_back must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve an environment variable
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// The LLM API key named by `llm.api_key_env`
    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.llm.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }
}

fn check_chunking(section: &str, size: usize, overlap: usize) -> Result<(), ConfigError> {
    if size == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{}.chunk_size must be at least 1",
            section
        )));
    }
    if overlap >= size {
        return Err(ConfigError::ValidationError(format!(
            "{}.chunk_overlap ({}) must be smaller than chunk_size ({})",
            section, overlap, size
        )));
    }
    Ok(())
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<ScholarConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path so the watcher sees the right directory
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let config = ScholarConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config. No file watching.
    pub fn from_config(config: ScholarConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<ScholarConfig> {
        self.config.load_full()
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = ScholarConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = self.config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the parent directory so editors that replace the file are seen
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let debounce = Duration::from_millis(500);
            let mut last_reload: Option<std::time::Instant> = None;

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce) {
                    continue;
                }

                // Let the writer finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match ScholarConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}
