// src/providers/gemini.rs
use anyhow::{bail, Context, Result};
use reqwest::Client;

use super::openai::api_error_message;
use crate::types::*;

fn normalize_base_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1beta") {
        base.to_string()
    } else {
        format!("{}/v1beta", base)
    }
}

fn normalize_model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Native `generateContent` call with a response schema, so the model
/// answers with a JSON array of `{message}` objects.
pub async fn chat(
    http: &Client,
    base_url: &str,
    api_key: Option<&str>,
    model: &str,
    system: &str,
    user_parts: &[String],
) -> Result<String> {
    let url = format!(
        "{}/{}:generateContent",
        normalize_base_url(base_url),
        normalize_model_path(model)
    );

    let request = build_request(system, user_parts);

    let mut req_builder = http
        .post(&url)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");

    if let Some(key) = api_key {
        req_builder = req_builder.header("X-goog-api-key", key);
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

    parse_response(&body)
}

fn build_request(system: &str, user_parts: &[String]) -> GeminiGenerateContentRequest {
    GeminiGenerateContentRequest {
        system_instruction: if system.trim().is_empty() {
            None
        } else {
            Some(GeminiContent {
                parts: vec![GeminiPart {
                    text: system.to_string(),
                }],
            })
        },
        contents: vec![GeminiContent {
            parts: user_parts
                .iter()
                .map(|text| GeminiPart { text: text.clone() })
                .collect(),
        }],
        generation_config: GeminiGenerationConfig::commit_messages(),
    }
}

fn parse_response(body: &str) -> Result<String> {
    let resp: GeminiGenerateContentResponse =
        serde_json::from_str(body).context("Failed to parse Gemini response")?;

    let text: String = resp
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        bail!("No response content from Gemini API");
    }
    Ok(text.trim().to_string())
}

// =============================================================================
// MODULE TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_base_and_model() {
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com/"),
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com/v1beta"),
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(normalize_model_path("gemini-2.0-flash-exp"), "models/gemini-2.0-flash-exp");
        assert_eq!(normalize_model_path("models/x"), "models/x");
    }

    #[test]
    fn request_keeps_each_user_part() {
        let parts = vec!["spec".to_string(), "diff".to_string()];
        let req = build_request("system", &parts);
        assert_eq!(req.contents[0].parts.len(), 2);
        assert_eq!(req.contents[0].parts[1].text, "diff");
        assert!(req.system_instruction.is_some());
        assert!(build_request("  ", &parts).system_instruction.is_none());
    }

    #[test]
    fn joins_text_of_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"message\":"},{"text":"\"a\"}]"}]}}]}"#;
        assert_eq!(parse_response(body).unwrap(), r#"[{"message":"a"}]"#);
    }

    #[test]
    fn missing_candidates_is_an_error() {
        assert!(parse_response(r#"{"candidates":[]}"#).is_err());
        assert!(parse_response(r#"{}"#).is_err());
    }
}
