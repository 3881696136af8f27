// src/updater.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");
const PACKAGE_NAME: &str = "commitah";

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    max_stable_version: String,
}

/// Compares dotted versions part by part over the length of `latest`;
/// parts missing from `current` count as zero.
pub fn is_new_version_available(current: &str, latest: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .trim_start_matches('v')
            .split('.')
            .map(|p| p.split('-').next().unwrap_or("").parse().unwrap_or(0))
            .collect()
    };
    let current = parse(current);
    let latest = parse(latest);

    for (i, l) in latest.iter().enumerate() {
        let c = current.get(i).copied().unwrap_or(0);
        if *l > c {
            return true;
        }
        if *l < c {
            return false;
        }
    }
    false
}

pub async fn fetch_latest_version() -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(format!("{}/{}", PACKAGE_NAME, CURRENT_VERSION))
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to create HTTP client")?;

    let url = format!("https://crates.io/api/v1/crates/{}", PACKAGE_NAME);
    let response = client
        .get(&url)
        .send()
        .await
        .context("Failed to fetch version info")?;

    if !response.status().is_success() {
        bail!("HTTP error! Status: {}", response.status());
    }

    let info: CrateResponse = response
        .json()
        .await
        .context("Failed to parse version info")?;
    Ok(info.krate.max_stable_version)
}

/// Prints a notice when a newer release exists. Never fails the run.
pub async fn check_for_updates() {
    match fetch_latest_version().await {
        Ok(latest) if is_new_version_available(CURRENT_VERSION, &latest) => {
            println!("New version available: {} (current {}).", latest, CURRENT_VERSION);
            println!("Update with: cargo install {} --force", PACKAGE_NAME);
        }
        Ok(_) => println!("{} {} is up to date.", PACKAGE_NAME, CURRENT_VERSION),
        Err(e) => warn!("Error checking for updates: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_patch_is_an_update() {
        assert!(is_new_version_available("1.2.0", "1.2.1"));
    }

    #[test]
    fn older_latest_is_not_an_update() {
        assert!(!is_new_version_available("2.0.0", "1.9.9"));
    }

    #[test]
    fn equal_versions_are_not_an_update() {
        assert!(!is_new_version_available("1.4.2", "1.4.2"));
    }

    #[test]
    fn missing_parts_count_as_zero() {
        assert!(is_new_version_available("1.2", "1.2.1"));
        assert!(!is_new_version_available("1.2.0", "1.2"));
        assert!(is_new_version_available("v0.9.0", "1.0.0"));
    }

    #[test]
    fn numeric_not_lexical_comparison() {
        assert!(is_new_version_available("1.9.0", "1.10.0"));
    }
}
