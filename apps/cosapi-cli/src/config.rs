//! CLI configuration loading.
//!
//! Configuration is stored as TOML:
//! - Linux: `$XDG_CONFIG_HOME/cosapi/config.toml` (or `~/.config/...`)
//! - Windows: `%APPDATA%/cosapi/config.toml`
//!
//! `COSAPI_SECRET_ID` and `COSAPI_SECRET_KEY` override the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cosapi_client::ClientConfig;

const ENV_SECRET_ID: &str = "COSAPI_SECRET_ID";
const ENV_SECRET_KEY: &str = "COSAPI_SECRET_KEY";

/// Loads the client configuration.
///
/// An explicit `path` must exist. Without one, the platform file is read
/// when present and defaults are used otherwise.
pub fn load(path: Option<&Path>) -> anyhow::Result<ClientConfig> {
    let config = match path {
        Some(path) => read(path)?,
        None => match config_path() {
            Some(path) if path.exists() => read(&path)?,
            _ => ClientConfig::default(),
        },
    };
    Ok(apply_env(config, |key| std::env::var(key).ok()))
}

fn read(path: &Path) -> anyhow::Result<ClientConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: ClientConfig =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Overrides credentials from the environment.
fn apply_env(mut config: ClientConfig, var: impl Fn(&str) -> Option<String>) -> ClientConfig {
    if let Some(id) = var(ENV_SECRET_ID).filter(|v| !v.is_empty()) {
        config.secret_id = id;
    }
    if let Some(key) = var(ENV_SECRET_KEY).filter(|v| !v.is_empty()) {
        config.secret_key = key;
    }
    config
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("cosapi").join("config.toml"))
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}
