use crate::{types::HealthResponse, AppState};
use axum::{extract::State, Json};

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config_manager.config();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: config.llm.provider.clone(),
        model: state.llm.model_name().to_string(),
    })
}
