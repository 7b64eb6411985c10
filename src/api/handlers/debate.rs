use super::read_pdf_upload;
use crate::{
    debate::{DebateEvent, DebateOrchestrator, DebateTranscript},
    documents::extract_text,
    llm::GenerationParams,
    types::{AppError, Result},
    AppState,
};
use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::convert::Infallible;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc;

const NDJSON: &str = "application/x-ndjson";

fn orchestrator(state: &AppState) -> DebateOrchestrator {
    let config = state.config_manager.config();
    DebateOrchestrator::new(
        Arc::clone(&state.llm),
        config.debate.clone(),
        GenerationParams::from_config(&config.llm),
    )
}

async fn paper_text(multipart: Multipart) -> Result<String> {
    let upload = read_pdf_upload(multipart).await?;
    let text = extract_text(upload.bytes).await?;
    if text.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Could not extract text from the uploaded PDF.".to_string(),
        ));
    }
    tracing::info!(filename = %upload.filename, chars = text.len(), "Paper loaded for debate");
    Ok(text)
}

fn ndjson_line(event: &DebateEvent) -> String {
    match serde_json::to_string(event) {
        Ok(mut line) => {
            line.push('\n');
            line
        }
        Err(e) => format!("{{\"type\":\"error\",\"error\":\"serialization failed: {}\"}}\n", e),
    }
}

/// Run a debate and stream each step as it happens
///
/// Each line of the response body is one JSON-encoded event. A failure after
/// the stream has started is reported as a final `error` event.
#[utoipa::path(
    post,
    path = "/api/debate",
    request_body(content_type = "multipart/form-data", description = "Paper PDF in the `file` field"),
    responses(
        (status = 200, description = "Newline-delimited JSON debate events", body = String, content_type = "application/x-ndjson"),
        (status = 400, description = "Missing, non-PDF or unreadable file")
    ),
    tag = "debate"
)]
pub async fn debate_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let paper = paper_text(multipart).await?;
    let orchestrator = orchestrator(&state);
    let (tx, mut rx) = mpsc::unbounded_channel::<DebateEvent>();

    tokio::spawn(async move {
        let events = tx.clone();
        let outcome = orchestrator
            .run_until(&paper, move |event| {
                // Receiver gone means the client disconnected
                match events.send(event.clone()) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(_) => ControlFlow::Break(()),
                }
            })
            .await;

        match outcome {
            Ok(_) => {}
            Err(_) if tx.is_closed() => {
                tracing::info!("Client disconnected, debate abandoned");
            }
            Err(e) => {
                tracing::error!(error = %e, "Debate failed mid-stream");
                let _ = tx.send(DebateEvent::Error {
                    error: e.client_message(),
                });
            }
        }
    });

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield Ok::<_, Infallible>(ndjson_line(&event));
        }
    };

    Ok((
        [(header::CONTENT_TYPE, NDJSON)],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Run a debate and return the full transcript
#[utoipa::path(
    post,
    path = "/api/debate-json",
    request_body(content_type = "multipart/form-data", description = "Paper PDF in the `file` field"),
    responses(
        (status = 200, description = "Complete debate transcript", body = DebateTranscript),
        (status = 400, description = "Missing, non-PDF or unreadable file"),
        (status = 502, description = "Model call failed")
    ),
    tag = "debate"
)]
pub async fn debate_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DebateTranscript>> {
    let paper = paper_text(multipart).await?;
    let transcript = orchestrator(&state).run(&paper, |_| {}).await?;
    Ok(Json(transcript))
}
