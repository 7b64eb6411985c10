//! Helpers for pulling JSON out of free-form model replies.

use crate::types::{AppError, Result};
use serde::de::DeserializeOwned;

/// Return the outermost `{...}` object in `text`, ignoring markdown code
/// fences and any prose around it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the JSON object embedded in a model reply.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T> {
    let json = extract_json_object(text)
        .ok_or_else(|| AppError::LLM("Model reply did not contain a JSON object".to_string()))?;
    serde_json::from_str(json)
        .map_err(|e| AppError::LLM(format!("Model reply was not valid JSON: {}", e)))
}
