use crate::llm::client::{CompletionRequest, LLMClient};
use crate::types::{AppError, ChatRole, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

/// Split `http://host:port` into `("http://host", port)`.
fn split_base_url(base_url: &str) -> (String, u16) {
    match url::Url::parse(base_url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("localhost");
            let port = parsed.port().unwrap_or(11434);
            (format!("{}://{}", parsed.scheme(), host), port)
        }
        Err(_) => ("http://localhost".to_string(), 11434),
    }
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let (host, port) = split_base_url(&base_url);
        let client = Ollama::new(host, port);

        Ok(Self { client, model })
    }
}

fn to_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    if let Some(system) = &request.system {
        messages.push(ChatMessage::system(system.clone()));
    }
    messages.extend(request.turns.iter().map(|turn| match turn.role {
        ChatRole::User => ChatMessage::user(turn.text.clone()),
        ChatRole::Model => ChatMessage::assistant(turn.text.clone()),
    }));
    messages
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if request.params != Default::default() {
            tracing::debug!("Ollama client uses the model's own sampling defaults");
        }

        let chat_request = ChatMessageRequest::new(self.model.clone(), to_messages(request));

        let response = self
            .client
            .send_chat_messages(chat_request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        let content = response.message.content;
        if content.trim().is_empty() {
            return Err(AppError::LLM("Empty response from Ollama".to_string()));
        }
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
