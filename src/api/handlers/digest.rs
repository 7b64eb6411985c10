use crate::{
    feeds::{Digest, TitleRewriter},
    types::{AppError, DigestQuery, DigestResponse, Result},
    AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

/// Recent papers from the configured research feeds
#[utoipa::path(
    get,
    path = "/api/digest",
    params(DigestQuery),
    responses(
        (status = 200, description = "Recent papers and optional catchy titles", body = DigestResponse),
        (status = 400, description = "Invalid parameters"),
        (status = 502, description = "Every feed source failed")
    ),
    tag = "digest"
)]
pub async fn digest(
    State(state): State<AppState>,
    Query(params): Query<DigestQuery>,
) -> Result<Json<DigestResponse>> {
    let config = state.config_manager.config();
    let query = params.query.unwrap_or_else(|| config.digest.query.clone());
    let max_results = params.max_results.unwrap_or(config.digest.max_results);
    let hours_back = params.hours_back.unwrap_or(config.digest.hours_back);

    if max_results == 0 {
        return Err(AppError::InvalidInput(
            "max_results must be at least 1".to_string(),
        ));
    }
    if hours_back <= 0 {
        return Err(AppError::InvalidInput(
            "hours_back must be positive".to_string(),
        ));
    }

    let digest = Digest::from_config(&config.digest, &state.http)?;
    let papers = digest.collect(&query, max_results, hours_back).await?;

    let catchy_titles = if params.catchy && !papers.is_empty() {
        TitleRewriter::new(Arc::clone(&state.llm))
            .rewrite(&papers, config.digest.catchy_titles)
            .await?
    } else {
        Vec::new()
    };

    Ok(Json(DigestResponse {
        papers,
        catchy_titles,
    }))
}
