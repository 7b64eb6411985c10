use super::read_pdf_upload;
use crate::{
    rag::PdfSummarizer,
    types::{AppError, Result, SummarizeUrlRequest, SummaryResponse},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use std::sync::Arc;

fn summarizer(state: &AppState) -> PdfSummarizer {
    PdfSummarizer::new(
        Arc::clone(&state.llm),
        Arc::clone(&state.embedder),
        Arc::clone(&state.summary_cache),
        state.config_manager.config().rag.clone(),
    )
}

/// Summarize an uploaded PDF
#[utoipa::path(
    post,
    path = "/summarize",
    request_body(content_type = "multipart/form-data", description = "PDF in the `file` field"),
    responses(
        (status = 200, description = "Summary of the document", body = SummaryResponse),
        (status = 400, description = "Missing, non-PDF or unreadable file"),
        (status = 502, description = "Model call failed")
    ),
    tag = "summarize"
)]
pub async fn summarize_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SummaryResponse>> {
    let upload = read_pdf_upload(multipart).await?;
    tracing::info!(filename = %upload.filename, "Summarizing uploaded PDF");

    let summary = summarizer(&state).summarize_bytes(upload.bytes).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Download a PDF from a URL and summarize it
#[utoipa::path(
    post,
    path = "/summarize_url",
    request_body = SummarizeUrlRequest,
    responses(
        (status = 200, description = "Summary of the document", body = SummaryResponse),
        (status = 400, description = "Missing or invalid URL, or download failed"),
        (status = 502, description = "Model call failed")
    ),
    tag = "summarize"
)]
pub async fn summarize_url(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeUrlRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>> {
    let url = payload
        .ok()
        .and_then(|Json(body)| body.url)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            AppError::InvalidInput("URL not provided in the request body".to_string())
        })?;

    tracing::info!(url = %url, "Summarizing PDF from URL");
    let summary = summarizer(&state).summarize_url(&state.http, &url).await?;
    Ok(Json(SummaryResponse { summary }))
}
