// src/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// =============================================================================
// OPENAI-COMPATIBLE API TYPES
// =============================================================================
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageResponse {
    pub content: Option<String>,
}

// =============================================================================
// COMMON ERROR TYPE
// =============================================================================
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: Option<String>,
}

// =============================================================================
// GEMINI API TYPES
// =============================================================================
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

impl GeminiGenerationConfig {
    /// Structured output: an array of `{message}` objects.
    pub fn commit_messages() -> Self {
        Self {
            response_mime_type: "application/json".into(),
            response_schema: json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "message": { "type": "STRING" }
                    }
                }
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeminiGenerateContentResponse {
    pub candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
}

// =============================================================================
// COMMIT MESSAGE CANDIDATES
// =============================================================================
/// One entry of the model's structured answer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CandidateEntry {
    Object { message: String },
    Plain(String),
}

impl CandidateEntry {
    pub fn into_message(self) -> String {
        match self {
            CandidateEntry::Object { message } | CandidateEntry::Plain(message) => message,
        }
    }
}

/// Some models wrap the list in an object instead of returning a bare array.
#[derive(Debug, Deserialize)]
pub struct CandidateEnvelope {
    #[serde(alias = "candidates", alias = "commits")]
    pub messages: Vec<CandidateEntry>,
}
