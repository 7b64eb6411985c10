use super::read_pdf_upload;
use crate::{
    graph::{GraphPipeline, VisGraph},
    types::{AppError, GraphQuery, GraphStatusResponse, KnowledgeGraphResponse, Result},
    AppState, StoredGraph,
};
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use std::sync::Arc;

/// Build a knowledge graph from an uploaded paper
///
/// The graph also becomes the one returned by `GET /api/knowledge-graph`.
#[utoipa::path(
    post,
    path = "/api/knowledge-graph",
    params(GraphQuery),
    request_body(content_type = "multipart/form-data", description = "Paper PDF in the `file` field"),
    responses(
        (status = 200, description = "Extracted graph", body = KnowledgeGraphResponse),
        (status = 400, description = "Missing, non-PDF or unreadable file"),
        (status = 502, description = "Model call failed")
    ),
    tag = "knowledge-graph"
)]
pub async fn build_graph(
    State(state): State<AppState>,
    Query(query): Query<GraphQuery>,
    multipart: Multipart,
) -> Result<Json<KnowledgeGraphResponse>> {
    let upload = read_pdf_upload(multipart).await?;
    let config = state.config_manager.config();

    let pipeline = GraphPipeline::new(Arc::clone(&state.llm), config.graph.clone());
    let run = pipeline.run(upload.bytes, &query.keyword_list()).await?;

    let valid = run.graph.to_document();
    let response = KnowledgeGraphResponse {
        success: true,
        filename: upload.filename.clone(),
        node_count: valid.nodes.len(),
        relationship_count: valid.relationships.len(),
        nodes: valid.nodes,
        relationships: valid.relationships,
        graph_data: run.graph.to_vis(),
    };

    *state.latest_graph.write() = Some(StoredGraph {
        filename: upload.filename,
        graph: run.graph,
    });

    Ok(Json(response))
}

/// Latest knowledge graph in vis-network format
#[utoipa::path(
    get,
    path = "/api/knowledge-graph",
    responses(
        (status = 200, description = "Latest graph", body = VisGraph),
        (status = 404, description = "No graph built yet")
    ),
    tag = "knowledge-graph"
)]
pub async fn latest_graph(State(state): State<AppState>) -> Result<Json<VisGraph>> {
    let guard = state.latest_graph.read();
    let stored = guard.as_ref().ok_or_else(|| {
        AppError::NotFound("No knowledge graph has been generated yet".to_string())
    })?;
    Ok(Json(stored.graph.to_vis()))
}

/// Knowledge graph service status
#[utoipa::path(
    get,
    path = "/api/knowledge-graph/status",
    responses(
        (status = 200, description = "Provider and graph status", body = GraphStatusResponse)
    ),
    tag = "knowledge-graph"
)]
pub async fn graph_status(State(state): State<AppState>) -> Json<GraphStatusResponse> {
    let config = state.config_manager.config();
    Json(GraphStatusResponse {
        connected: true,
        provider: config.llm.provider.clone(),
        model: state.llm.model_name().to_string(),
        has_graph: state.latest_graph.read().is_some(),
    })
}
