// src/providers/openai.rs
use anyhow::{bail, Context, Result};
use reqwest::Client;

use crate::types::*;

/// OpenAI-compatible `POST {base}/chat/completions`. Also serves DeepSeek,
/// Ollama, Gemini's compatibility endpoint and custom servers.
pub async fn chat(
    http: &Client,
    base_url: &str,
    api_key: Option<&str>,
    model: &str,
    system: &str,
    user: &str,
) -> Result<String> {
    let url = format!("{}/chat/completions", base_url);

    let request = ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage { role: "system".to_string(), content: system.to_string() },
            ChatMessage { role: "user".to_string(), content: user.to_string() },
        ],
    };

    let mut req_builder = http
        .post(&url)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");

    if let Some(key) = api_key {
        req_builder = req_builder.header("Authorization", format!("Bearer {}", key));
    }

    let response = req_builder
        .json(&request)
        .send()
        .await
        .context("Failed to send request")?;

    let status = response.status();
    let body = response.text().await.context("Failed to read response body")?;

    if !status.is_success() {
        bail!("{}", api_error_message(status, &body));
    }

    parse_chat_response(&body)
}

pub(crate) fn parse_chat_response(body: &str) -> Result<String> {
    let resp: ChatCompletionResponse =
        serde_json::from_str(body).context("Failed to parse response")?;

    resp.choices
        .first()
        .and_then(|c| c.message.content.as_ref())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("No response content from API")
}

/// Prefer the provider's own error message over the raw body.
pub(crate) fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ApiError>(body) {
        if let Some(msg) = err.error.and_then(|d| d.message) {
            return format!("API error ({}): {}", status, msg);
        }
    }
    let end = body
        .char_indices()
        .nth(500)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    format!("API error ({}): {}", status, &body[..end])
}
