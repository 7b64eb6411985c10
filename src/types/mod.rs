use crate::graph::{GraphNode, Relationship, VisGraph};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============= Summarization Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummarizeUrlRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

// ============= Document Types =============

/// Simple size statistics for extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct TextStats {
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        Self {
            char_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
            line_count: text.lines().count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractPdfResponse {
    pub success: bool,
    pub filename: String,
    pub text: String,
    pub metadata: TextStats,
}

// ============= Chat Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of a conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

// ============= Health Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
    pub model: String,
}

// ============= Digest Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paper {
    pub source: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatchyTitle {
    pub original: String,
    pub catchy: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DigestResponse {
    pub papers: Vec<Paper>,
    pub catchy_titles: Vec<CatchyTitle>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DigestQuery {
    pub query: Option<String>,
    pub max_results: Option<usize>,
    pub hours_back: Option<i64>,
    /// Also rewrite titles
    #[serde(default)]
    pub catchy: bool,
}

// ============= Knowledge Graph Types =============

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GraphQuery {
    /// Comma-separated keywords used to pick relevant chunks
    pub keywords: Option<String>,
}

impl GraphQuery {
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeGraphResponse {
    pub success: bool,
    pub filename: String,
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<Relationship>,
    pub node_count: usize,
    pub relationship_count: usize,
    pub graph_data: VisGraph,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GraphStatusResponse {
    pub connected: bool,
    pub provider: String,
    pub model: String,
    pub has_graph: bool,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Response was blocked by safety filters: {0}")]
    Blocked(String),

    #[error("{0}")]
    Pdf(String),

    #[error("{0}")]
    Fetch(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AppError::InvalidInput(_) | AppError::Pdf(_) | AppError::Fetch(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Blocked(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LLM(_) | AppError::Transcript(_) | AppError::Feed(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to API clients. Validation errors are passed through
    /// verbatim, everything else keeps its prefix.
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.client_message()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(err: crate::utils::toml_config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
