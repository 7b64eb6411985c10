//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for Scholar, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Summaries
//! - `POST /summarize` - RAG summary of an uploaded PDF (multipart `file`)
//! - `POST /summarize_url` - RAG summary of a PDF at `{"url": ...}`
//!
//! ## Documents
//! - `POST /api/extract-pdf` - Text and counts of an uploaded PDF
//!
//! ## Debate
//! - `POST /api/debate` - Debate over an uploaded paper, streamed as NDJSON
//! - `POST /api/debate-json` - Same debate, returned as one transcript
//!
//! ## Knowledge Graph
//! - `POST /api/knowledge-graph` - Build a graph from an uploaded paper
//! - `GET /api/knowledge-graph` - Latest graph in vis-network format
//! - `GET /api/knowledge-graph/status` - Provider and graph status
//!
//! ## Digest
//! - `GET /api/digest` - Recent papers, optionally with catchy titles
//!
//! ## Health (`/api/health`)
//! - `GET /api/health` - Health check endpoint
//!
//! Errors are returned as `{"error": "..."}` with a matching status code.
//! The OpenAPI document is served at `/api/openapi.json`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

pub use routes::{create_router, serve};

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Scholar API", description = "Research assistant agents over a hosted LLM"),
    paths(
        handlers::health::health,
        handlers::summarize::summarize_upload,
        handlers::summarize::summarize_url,
        handlers::documents::extract_pdf,
        handlers::debate::debate_stream,
        handlers::debate::debate_json,
        handlers::graph::build_graph,
        handlers::graph::latest_graph,
        handlers::graph::graph_status,
        handlers::digest::digest,
    ),
    components(schemas(
        crate::types::HealthResponse,
        crate::types::SummarizeUrlRequest,
        crate::types::SummaryResponse,
        crate::types::ExtractPdfResponse,
        crate::types::TextStats,
        crate::types::Paper,
        crate::types::CatchyTitle,
        crate::types::DigestResponse,
        crate::types::KnowledgeGraphResponse,
        crate::types::GraphStatusResponse,
        crate::graph::GraphNode,
        crate::graph::Relationship,
        crate::graph::VisGraph,
        crate::graph::model::VisNode,
        crate::graph::model::VisEdge,
        crate::debate::DebateTranscript,
        crate::debate::DebateMessage,
        crate::debate::DebateConclusion,
        crate::debate::DebateRole,
        crate::debate::Decision,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "summarize", description = "RAG summaries of PDFs"),
        (name = "documents", description = "PDF text extraction"),
        (name = "debate", description = "Two-agent paper debate"),
        (name = "knowledge-graph", description = "Knowledge graphs from papers"),
        (name = "digest", description = "Recent research feeds")
    )
)]
pub struct ApiDoc;
