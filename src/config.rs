// src/config.rs
use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

// =============================================================================
// DEFAULTS
// =============================================================================
pub const CONFIG_FILENAME: &str = ".commitahconfig";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_MESSAGE_SPEC: &str =
    "More tech detailing and comprehensive in one line message.";
pub const DEFAULT_SIZE_OPTION: u32 = 3;

/// Key written by releases that only knew about Gemini.
const LEGACY_API_KEY: &str = "geminiApiKey";

// =============================================================================
// CONFIG RECORD
// =============================================================================
/// Flat settings record persisted as JSON. Absent or mistyped keys take
/// their default one by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub provider: String,
    pub provider_api_key: String,
    pub provider_url: String,
    pub model: String,
    pub message_spec: String,
    pub size_option: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: String::new(),
            provider_api_key: String::new(),
            provider_url: String::new(),
            model: DEFAULT_MODEL.to_string(),
            message_spec: DEFAULT_MESSAGE_SPEC.to_string(),
            size_option: DEFAULT_SIZE_OPTION,
        }
    }
}

impl Config {
    /// Merges each well-typed key of `map` over the defaults.
    pub fn from_json_map(mut map: Map<String, Value>) -> Config {
        let mut config = Config::default();
        take(&mut map, "provider", &mut config.provider);
        take(&mut map, "providerApiKey", &mut config.provider_api_key);
        take(&mut map, "providerUrl", &mut config.provider_url);
        take(&mut map, "model", &mut config.model);
        take(&mut map, "messageSpec", &mut config.message_spec);
        take(&mut map, "sizeOption", &mut config.size_option);

        if config.provider_api_key.is_empty() {
            take(&mut map, LEGACY_API_KEY, &mut config.provider_api_key);
        }
        config
    }

    /// Number of candidates to ask for, never below one.
    pub fn result_count(&self) -> u32 {
        self.size_option.max(1)
    }

    pub fn masked_api_key(&self) -> String {
        if self.provider_api_key.is_empty() {
            return "(not set)".into();
        }
        let shown: String = self.provider_api_key.chars().take(8).collect();
        format!("{}...", shown)
    }

    fn apply(&mut self, update: ConfigUpdate) {
        if let Some(v) = update.provider {
            self.provider = v;
        }
        if let Some(v) = update.provider_api_key {
            self.provider_api_key = v;
        }
        if let Some(v) = update.provider_url {
            self.provider_url = v;
        }
        if let Some(v) = update.model {
            self.model = v;
        }
        if let Some(v) = update.message_spec {
            self.message_spec = v;
        }
        if let Some(v) = update.size_option {
            self.size_option = v.max(1);
        }
    }
}

fn take<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = map.remove(key) else {
        return;
    };
    match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => *slot = v,
        Err(e) => warn!(key, %value, "ignoring invalid config value: {}", e),
    }
}

/// Partial record merged over the stored config by [`ConfigStore::update`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub provider: Option<String>,
    pub provider_api_key: Option<String>,
    pub provider_url: Option<String>,
    pub model: Option<String>,
    pub message_spec: Option<String>,
    pub size_option: Option<u32>,
}

// =============================================================================
// CONFIG STORE
// =============================================================================
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.commitahconfig`.
    pub fn user_default() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::new(home.join(CONFIG_FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file on every call. A missing file is created with defaults;
    /// a broken one is left alone and defaults are returned.
    pub fn load(&self) -> Config {
        match self.read() {
            Ok(Some(config)) => config,
            Ok(None) => {
                warn!(path = %self.path.display(), "config file not found, creating default config");
                let config = Config::default();
                if let Err(e) = self.save(&config) {
                    error!("failed to write default config: {:#}", e);
                }
                config
            }
            Err(e) => {
                error!(path = %self.path.display(), "failed to load config file, using defaults: {:#}", e);
                Config::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist yet.
    fn read(&self) -> Result<Option<Config>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path).context("Failed to read config file")?;
        let map = serde_json::from_str::<Map<String, Value>>(&text)
            .context("Config file is not a JSON object")?;
        Ok(Some(Config::from_json_map(map)))
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        config
            .serialize(&mut ser)
            .context("Failed to serialize config")?;
        buf.push(b'\n');
        std::fs::write(&self.path, buf).context("Failed to write config file")?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    /// Read-merge-write. Returns the merged record. A file that cannot be
    /// parsed is never overwritten.
    pub fn update(&self, update: ConfigUpdate) -> Result<Config> {
        let mut config = match self.read() {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => bail!(
                "Refusing to overwrite unreadable config {}: {:#}",
                self.path.display(),
                e
            ),
        };
        config.apply(update);
        self.save(&config)?;
        Ok(config)
    }
}

// =============================================================================
// MODULE TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join(CONFIG_FILENAME))
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.provider, "");
        assert_eq!(config.provider_api_key, "");
        assert_eq!(config.provider_url, "");
        assert_eq!(config.size_option, 3);
        assert_eq!(config.model, "gemini-2.0-flash-exp");
    }

    #[test]
    fn partial_file_is_merged_over_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"sizeOption": 5}"#).unwrap();

        let config = store.load();
        assert_eq!(config.size_option, 5);
        assert_eq!(
            config,
            Config {
                size_option: 5,
                ..Config::default()
            }
        );
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let config = store.load();
        assert_eq!(config, Config::default());
        assert!(store.path().exists());
    }

    #[test]
    fn invalid_json_falls_back_without_overwriting() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), Config::default());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn mistyped_key_keeps_the_rest_of_the_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"provider": "OpenAI", "providerApiKey": "sk-keep", "sizeOption": null}"#,
        )
        .unwrap();

        let config = store.load();
        assert_eq!(config.provider, "OpenAI");
        assert_eq!(config.provider_api_key, "sk-keep");
        assert_eq!(config.size_option, DEFAULT_SIZE_OPTION);

        let updated = store
            .update(ConfigUpdate {
                size_option: Some(4),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.provider_api_key, "sk-keep");
        assert_eq!(store.load().provider_api_key, "sk-keep");
        assert_eq!(store.load().size_option, 4);
    }

    #[test]
    fn negative_size_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"providerApiKey": "sk", "sizeOption": -2}"#).unwrap();

        let config = store.load();
        assert_eq!(config.provider_api_key, "sk");
        assert_eq!(config.size_option, DEFAULT_SIZE_OPTION);
    }

    #[test]
    fn legacy_gemini_key_is_read_as_provider_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"geminiApiKey": "AIza-legacy", "messageSpec": "x", "sizeOption": 3}"#,
        )
        .unwrap();

        let config = store.load();
        assert_eq!(config.provider_api_key, "AIza-legacy");
        assert_eq!(config.message_spec, "x");

        // Rewritten under the current key name.
        store.update(ConfigUpdate::default()).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\"providerApiKey\": \"AIza-legacy\""));
    }

    #[test]
    fn update_refuses_to_overwrite_broken_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        let err = store
            .update(ConfigUpdate {
                provider_api_key: Some("sk-new".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("Refusing to overwrite"));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn saved_file_uses_camel_case_keys_and_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&Config::default()).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n    \"providerApiKey\": \"\""));
        assert!(text.contains("\"sizeOption\": 3"));
        assert!(text.contains("\"messageSpec\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn update_merges_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"messageSpec": "conventional"}"#).unwrap();

        let updated = store
            .update(ConfigUpdate {
                provider: Some("DeepSeek".into()),
                provider_api_key: Some("sk-deep".into()),
                size_option: Some(4),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.provider, "DeepSeek");
        assert_eq!(updated.message_spec, "conventional");

        let reloaded = store.load();
        assert_eq!(reloaded, updated);
        assert_eq!(reloaded.size_option, 4);
    }

    #[test]
    fn update_never_stores_zero_results() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let updated = store
            .update(ConfigUpdate {
                size_option: Some(0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.size_option, 1);
    }

    #[test]
    fn result_count_clamps_zero() {
        let config = Config {
            size_option: 0,
            ..Config::default()
        };
        assert_eq!(config.result_count(), 1);
    }

    #[test]
    fn masked_api_key_shows_prefix_only() {
        let config = Config {
            provider_api_key: "sk-1234567890abcdef".into(),
            ..Config::default()
        };
        assert_eq!(config.masked_api_key(), "sk-12345...");
        assert_eq!(Config::default().masked_api_key(), "(not set)");
    }
}
