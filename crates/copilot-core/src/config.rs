//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the login request variant and the
//! remembered email.
//!
//! Configuration is stored at `~/.config/alfa-copilot/config.json`. Values
//! can be overridden with `ALFA_COPILOT_*` environment variables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "alfa-copilot";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API base used when neither the config file nor the environment set one
pub const DEFAULT_API_BASE: &str = "https://maxbot-withoutdocker.onrender.com";

pub const ENV_API_BASE: &str = "ALFA_COPILOT_API_BASE";
pub const ENV_LOGIN_METHOD: &str = "ALFA_COPILOT_LOGIN_METHOD";
pub const ENV_EMAIL: &str = "ALFA_COPILOT_EMAIL";
pub const ENV_PASSWORD: &str = "ALFA_COPILOT_PASSWORD";

/// Which shape of login request the authentication endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    /// `POST {base}/login` with a JSON body
    #[default]
    Post,
    /// `GET {base}/login/` without a body
    Get,
}

impl FromStr for LoginMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" => Ok(LoginMethod::Post),
            "get" => Ok(LoginMethod::Get),
            other => Err(anyhow::anyhow!("Unknown login method: {}", other)),
        }
    }
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginMethod::Post => write!(f, "POST"),
            LoginMethod::Get => write!(f, "GET"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base: Option<String>,
    #[serde(default)]
    pub login_method: LoginMethod,
    pub last_email: Option<String>,
    #[serde(default)]
    pub remember_me: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `ALFA_COPILOT_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup(ENV_API_BASE).filter(|s| !s.trim().is_empty()) {
            self.api_base = Some(base);
        }
        if let Some(method) = lookup(ENV_LOGIN_METHOD) {
            match method.parse() {
                Ok(m) => self.login_method = m,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_LOGIN_METHOD),
            }
        }
        if let Some(email) = lookup(ENV_EMAIL).filter(|s| !s.is_empty()) {
            self.last_email = Some(email);
        }
    }

    /// Effective API base without a trailing slash
    pub fn api_base(&self) -> String {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
