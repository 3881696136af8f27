// src/tests.rs
use crate::cli::Cli;
use crate::config::{Config, ConfigStore, ConfigUpdate};
use crate::provider::{is_configured, Endpoint, Provider, WireFormat};
use clap::Parser;
use tempfile::TempDir;

// =========================================================================
// CLI TESTS
// =========================================================================

#[test]
fn cli_no_flags_runs_commit_flow() {
    let cli = Cli::try_parse_from(["commitah"]).unwrap();
    assert!(!cli.config);
    assert!(!cli.config_update);
    assert!(!cli.show);
    assert!(!cli.check_update);
    assert!(!cli.verbose);
}

#[test]
fn cli_parses_show_and_verbose() {
    let cli = Cli::try_parse_from(["commitah", "--show", "-v"]).unwrap();
    assert!(cli.show);
    assert!(cli.verbose);
}

#[test]
fn cli_accepts_both_config_update_spellings() {
    for flag in ["--config-update", "--configUpdate"] {
        let cli = Cli::try_parse_from(["commitah", flag]).unwrap();
        assert!(cli.config_update, "{} should set config_update", flag);
    }
}

#[test]
fn cli_parses_config_and_check_update() {
    let cli = Cli::try_parse_from(["commitah", "--config"]).unwrap();
    assert!(cli.config);
    let cli = Cli::try_parse_from(["commitah", "--check-update"]).unwrap();
    assert!(cli.check_update);
}

#[test]
fn cli_rejects_unknown_flags() {
    assert!(Cli::try_parse_from(["commitah", "--push"]).is_err());
}

// =========================================================================
// CONFIG → ENDPOINT TESTS
// =========================================================================

fn store() -> (TempDir, ConfigStore) {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join(".commitahconfig"));
    (dir, store)
}

#[test]
fn saved_builtin_provider_resolves_to_openai_compatible_endpoint() {
    let (_dir, store) = store();
    store
        .update(ConfigUpdate {
            provider: Some(Provider::OpenAi.label().into()),
            provider_api_key: Some("sk-live".into()),
            provider_url: Provider::OpenAi.base_url().map(String::from),
            model: Some("gpt-4o-mini".into()),
            ..ConfigUpdate::default()
        })
        .unwrap();

    let config = store.load();
    assert!(is_configured(&config));
    let endpoint = Endpoint::resolve(&config);
    assert_eq!(endpoint.format, WireFormat::OpenAiCompatible);
    assert_eq!(endpoint.base_url, "https://api.openai.com/v1");
    assert_eq!(endpoint.api_key.as_deref(), Some("sk-live"));
}

#[test]
fn fresh_install_needs_configuration() {
    let (_dir, store) = store();
    let config = store.load();
    assert_eq!(config, Config::default());
    assert!(!is_configured(&config));
}

#[test]
fn legacy_gemini_key_keeps_working_after_reload() {
    let (dir, store) = store();
    std::fs::write(
        dir.path().join(".commitahconfig"),
        r#"{"geminiApiKey": "AIza-old", "sizeOption": 2}"#,
    )
    .unwrap();

    let config = store.load();
    assert!(is_configured(&config));
    assert_eq!(config.result_count(), 2);
    assert_eq!(Endpoint::resolve(&config).format, WireFormat::GeminiNative);
}
