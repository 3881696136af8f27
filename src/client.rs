// src/client.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::git::StagedChanges;
use crate::prompts::{commit_prompt_parts, commit_user_prompt, COMMIT_SYSTEM_PROMPT};
use crate::provider::{Endpoint, WireFormat};
use crate::providers::{gemini, openai};
use crate::types::{CandidateEntry, CandidateEnvelope};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Produces commit message candidates for a set of staged changes.
#[async_trait]
pub trait CandidateSource {
    async fn generate(&self, changes: &StagedChanges) -> Result<Vec<String>>;
}

pub struct LlmClient {
    http: Client,
    endpoint: Endpoint,
    model: String,
    message_spec: String,
    count: u32,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if let Ok(proxy_url) = std::env::var("COMMITAH_PROXY") {
            let proxy_url = proxy_url.trim();
            if !proxy_url.is_empty() {
                builder = builder.proxy(Proxy::all(proxy_url)?);
            }
        }

        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: Endpoint::resolve(config),
            model: config.model.clone(),
            message_spec: config.message_spec.clone(),
            count: config.result_count(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, changes: &StagedChanges) -> Result<String> {
        let api_key = self.endpoint.api_key.as_deref();
        debug!(
            format = ?self.endpoint.format,
            base_url = %self.endpoint.base_url,
            model = %self.model,
            "requesting commit messages"
        );

        match self.endpoint.format {
            WireFormat::GeminiNative => {
                let parts = commit_prompt_parts(changes, &self.message_spec, self.count);
                gemini::chat(
                    &self.http,
                    &self.endpoint.base_url,
                    api_key,
                    &self.model,
                    COMMIT_SYSTEM_PROMPT,
                    &parts,
                )
                .await
            }
            WireFormat::OpenAiCompatible => {
                let prompt = commit_user_prompt(changes, &self.message_spec, self.count);
                openai::chat(
                    &self.http,
                    &self.endpoint.base_url,
                    api_key,
                    &self.model,
                    COMMIT_SYSTEM_PROMPT,
                    &prompt,
                )
                .await
            }
        }
    }
}

#[async_trait]
impl CandidateSource for LlmClient {
    async fn generate(&self, changes: &StagedChanges) -> Result<Vec<String>> {
        let text = self.complete(changes).await?;
        debug!(chars = text.len(), "received completion");
        parse_candidates(&text)
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================
/// Extracts the ordered candidate list from the model's answer.
pub fn parse_candidates(text: &str) -> Result<Vec<String>> {
    let body = strip_code_fence(text);

    let entries: Vec<CandidateEntry> = serde_json::from_str::<Vec<CandidateEntry>>(body)
        .or_else(|_| serde_json::from_str::<CandidateEnvelope>(body).map(|e| e.messages))
        .with_context(|| {
            format!(
                "Failed to parse commit messages from response: {}",
                preview(body)
            )
        })?;

    Ok(entries
        .into_iter()
        .map(|e| e.into_message().trim().to_string())
        .filter(|m| !m.is_empty())
        .collect())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the opening fence.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().trim_end_matches("```").trim()
}

fn preview(text: &str) -> String {
    let short: String = text.chars().take(200).collect();
    if short.len() < text.len() {
        format!("{}...", short)
    } else {
        short
    }
}
