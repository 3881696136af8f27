// src/commands/config.rs
use anyhow::{Context, Result};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::Command;
use tracing::warn;

use crate::config::{Config, ConfigStore};
use crate::provider::{is_configured, Provider, GEMINI_KEY_URL};
use crate::ui::SettingsWizard;

/// Human-readable dump of the stored settings; the key is masked.
pub fn describe_config(config: &Config, path: &Path) -> String {
    let or_unset = |v: &str| {
        if v.trim().is_empty() {
            "(not set)".to_string()
        } else {
            v.to_string()
        }
    };

    [
        format!("Config file:    {}", path.display()),
        String::new(),
        format!("Provider:       {}", or_unset(&config.provider)),
        format!("API Key:        {}", config.masked_api_key()),
        format!("Provider URL:   {}", or_unset(&config.provider_url)),
        format!("Model:          {}", or_unset(&config.model)),
        format!("Message spec:   {}", config.message_spec),
        format!("Options size:   {}", config.result_count()),
    ]
    .join("\n")
}

pub fn cmd_show_config(store: &ConfigStore) -> Result<()> {
    let config = store.load();
    println!("{}", describe_config(&config, store.path()));
    Ok(())
}

/// Runs the settings wizard. `true` when the settings were saved.
pub fn cmd_config_update(store: &ConfigStore) -> Result<bool> {
    let saved = SettingsWizard::run(store)?;
    if saved {
        let config = store.load();
        println!("Configuration updated successfully:\n");
        println!("{}", describe_config(&config, store.path()));
    } else {
        println!("Configuration unchanged.");
    }
    Ok(saved)
}

/// Returns a usable config, launching the wizard when credentials are
/// missing. `None` when the user cancels it.
pub fn ensure_configured(store: &ConfigStore) -> Result<Option<Config>> {
    ensure_configured_with(store, |config| {
        if Provider::from_name(&config.provider).is_none() {
            offer_gemini_key_page();
        }
        SettingsWizard::run(store)
    })
}

/// `launch` gets the incomplete config and reports whether settings were saved.
pub fn ensure_configured_with<F>(store: &ConfigStore, launch: F) -> Result<Option<Config>>
where
    F: FnOnce(&Config) -> Result<bool>,
{
    let config = store.load();
    if is_configured(&config) {
        return Ok(Some(config));
    }

    warn!(provider = %config.provider, "provider credentials missing");
    println!("No AI provider is configured yet.");
    if Provider::from_name(&config.provider).is_none() {
        println!("A free Gemini API key is available at {}", GEMINI_KEY_URL);
    }

    if !launch(&config)? {
        return Ok(None);
    }
    let config = store.load();
    Ok(is_configured(&config).then_some(config))
}

// =============================================================================
// GEMINI KEY PAGE
// =============================================================================
/// Answer to a `[Y/n]` style question; blank input takes `default`.
pub fn parse_yes(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

/// Asks once whether to open the key page. Never fatal: a missing terminal
/// or browser only costs the shortcut.
fn offer_gemini_key_page() {
    if !io::stdin().is_terminal() {
        return;
    }
    let answer = || -> Result<bool> {
        print!("Open browser to create a new Gemini API key? [Y/n] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(parse_yes(&input, true))
    };

    match answer() {
        Ok(true) => {
            if let Err(e) = open_url(GEMINI_KEY_URL) {
                warn!(error = %e, "could not open browser");
                println!("Open {} to create a key.", GEMINI_KEY_URL);
            }
        }
        Ok(false) => {}
        Err(e) => warn!(error = %e, "could not read answer"),
    }
}

fn open_url(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg(url)
            .output()
            .context("Failed to launch open")?;
        return Ok(());
    }

    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open")
            .arg(url)
            .output()
            .context("Failed to launch xdg-open")?;
        return Ok(());
    }

    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", "", url])
            .output()
            .context("Failed to launch start")?;
        return Ok(());
    }

    #[allow(unreachable_code)]
    Err(anyhow::anyhow!("Opening {} is not supported on this platform", url))
}
