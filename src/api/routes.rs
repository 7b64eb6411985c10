use crate::api::{handlers, ApiDoc};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Routes under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/extract-pdf", post(handlers::documents::extract_pdf))
        .route("/debate", post(handlers::debate::debate_stream))
        .route("/debate-json", post(handlers::debate::debate_json))
        .route(
            "/knowledge-graph",
            get(handlers::graph::latest_graph).post(handlers::graph::build_graph),
        )
        .route(
            "/knowledge-graph/status",
            get(handlers::graph::graph_status),
        )
        .route("/digest", get(handlers::digest::digest))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Full application router with tracing, CORS and upload limits.
pub fn create_router(state: AppState) -> Router {
    let server = state.config_manager.config().server.clone();
    let max_upload = server.max_upload_bytes();

    Router::new()
        .route("/summarize", post(handlers::summarize::summarize_upload))
        .route("/summarize_url", post(handlers::summarize::summarize_url))
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(RequestBodyLimitLayer::new(max_upload))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `addr` (`host:port`) and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> crate::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| crate::AppError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
        })
        .await
        .map_err(|e| crate::AppError::Internal(format!("Server error: {}", e)))
}
