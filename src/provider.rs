// src/provider.rs
use crate::config::Config;

// =============================================================================
// PROVIDER CONSTANTS
// =============================================================================
pub const PROVIDER_OPENAI: &str = "https://api.openai.com/v1";
pub const PROVIDER_GEMINI: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const PROVIDER_DEEPSEEK: &str = "https://api.deepseek.com/v1";
pub const PROVIDER_OLLAMA: &str = "http://localhost:11434/v1";
pub const OLLAMA_SERVICE: &str = "http://localhost:11434";
pub const GEMINI_NATIVE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const GEMINI_KEY_URL: &str = "https://aistudio.google.com/apikey";

/// Request/response schema spoken by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    OpenAiCompatible,
    GeminiNative,
}

// =============================================================================
// REGISTRY
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
    DeepSeek,
    Ollama,
    Custom,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::OpenAi,
        Provider::Gemini,
        Provider::DeepSeek,
        Provider::Ollama,
        Provider::Custom,
    ];

    /// Display name, also the value stored in the config file.
    pub fn label(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::DeepSeek => "DeepSeek",
            Provider::Ollama => "Ollama",
            Provider::Custom => "Custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Provider> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi),
            "gemini" | "google" => Some(Provider::Gemini),
            "deepseek" => Some(Provider::DeepSeek),
            "ollama" | "local" => Some(Provider::Ollama),
            "custom" => Some(Provider::Custom),
            _ => None,
        }
    }

    /// `None` for Custom: switching to it keeps whatever model was typed.
    pub fn default_model(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("gpt-4o-mini"),
            Provider::Gemini => Some("gemini-2.0-flash-exp"),
            Provider::DeepSeek => Some("deepseek-chat"),
            Provider::Ollama => Some("llama3.2"),
            Provider::Custom => None,
        }
    }

    /// Fixed base URL. Ollama's is only used while no URL has been stored.
    pub fn base_url(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some(PROVIDER_OPENAI),
            Provider::Gemini => Some(PROVIDER_GEMINI),
            Provider::DeepSeek => Some(PROVIDER_DEEPSEEK),
            Provider::Ollama => Some(PROVIDER_OLLAMA),
            Provider::Custom => None,
        }
    }

    /// Whether the credential field holds a service URL instead of a key.
    pub fn credential_is_url(self) -> bool {
        self == Provider::Ollama
    }

    pub fn credential_label(self) -> String {
        if self.credential_is_url() {
            format!("{} URL:", self.label())
        } else {
            format!("{} API Key:", self.label())
        }
    }
}

// =============================================================================
// ENDPOINT RESOLUTION
// =============================================================================
/// Where and how to send the completion request for a given config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub format: WireFormat,
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Endpoint {
    pub fn resolve(config: &Config) -> Endpoint {
        let api_key = Some(config.provider_api_key.trim().to_string()).filter(|k| !k.is_empty());

        let Some(provider) = Provider::from_name(&config.provider) else {
            // Configs written before providers existed only carry a Gemini key.
            return Endpoint {
                format: WireFormat::GeminiNative,
                base_url: GEMINI_NATIVE.to_string(),
                api_key,
            };
        };

        let base_url = Some(config.provider_url.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| provider.base_url().map(str::to_string))
            .unwrap_or_default();

        let format = if is_gemini_native_url(&base_url) {
            WireFormat::GeminiNative
        } else {
            WireFormat::OpenAiCompatible
        };

        Endpoint {
            format,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

fn is_gemini_native_url(url: &str) -> bool {
    url.contains("generativelanguage.googleapis.com")
        && !url.trim_end_matches('/').ends_with("/openai")
}

/// True when the config carries enough to reach a provider.
pub fn is_configured(config: &Config) -> bool {
    match Provider::from_name(&config.provider) {
        Some(Provider::Ollama) => true,
        Some(Provider::Custom) => !config.provider_url.trim().is_empty(),
        _ => !config.provider_api_key.trim().is_empty(),
    }
}
