use crate::llm::client::{CompletionRequest, LLMClient};
use crate::types::{AppError, ChatRole, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

fn to_messages(request: &CompletionRequest) -> Vec<ChatCompletionRequestMessage> {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    if let Some(system) = &request.system {
        messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage::from(system.clone()),
        ));
    }
    messages.extend(request.turns.iter().map(|turn| match turn.role {
        ChatRole::User => {
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(
                turn.text.clone(),
            ))
        }
        ChatRole::Model => ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessage::from(turn.text.clone()),
        ),
    }));
    messages
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(to_messages(request));
        if let Some(temperature) = request.params.temperature {
            args.temperature(temperature);
        }
        if let Some(max_tokens) = request.params.max_output_tokens {
            args.max_completion_tokens(max_tokens);
        }

        let chat_request = args
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
