use crate::llm::client::{CompletionRequest, LLMClient};
use crate::types::{AppError, ChatRole, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trim whitespace and quote characters that tend to survive copy-pasting
/// keys into `.env` files.
pub fn sanitize_api_key(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, base_url: String, model: String, timeout_secs: u64) -> Result<Self> {
        let api_key = sanitize_api_key(api_key);
        if api_key.is_empty() {
            return Err(AppError::Config("Gemini API key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// ============= Wire Types =============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn build_body(request: &CompletionRequest) -> GenerateContentRequest<'_> {
    let contents = request
        .turns
        .iter()
        .map(|turn| Content {
            role: Some(match turn.role {
                ChatRole::User => "user",
                ChatRole::Model => "model",
            }),
            parts: vec![Part { text: &turn.text }],
        })
        .collect();

    let system_instruction = request.system.as_deref().map(|text| Content {
        role: None,
        parts: vec![Part { text }],
    });

    let params = request.params;
    let generation_config = (params.temperature.is_some() || params.max_output_tokens.is_some())
        .then_some(GenerationConfig {
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
        });

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config,
    }
}

fn into_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AppError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::LLM("No candidates in Gemini response".to_string()))?;

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_default();
        return match reason.as_str() {
            "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" => Err(AppError::Blocked(reason)),
            _ => Err(AppError::LLM("Empty response from Gemini".to_string())),
        };
    }

    Ok(text)
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_body(request);

        tracing::debug!(
            model = %self.model,
            turns = request.turns.len(),
            "Sending Gemini generateContent request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Gemini API error ({}): {}",
                status, text
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid Gemini response: {}", e)))?;

        into_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
