//! Runtime configuration: an optional JSON file, overridden by environment
//! variables, overridden in turn by CLI flags in the binary.
//!
//! Recognized variables:
//! - `LEADERBOARD_API_URL`
//! - `LEADERBOARD_COGNITO_DOMAIN`
//! - `LEADERBOARD_COGNITO_CLIENT_ID`
//! - `LEADERBOARD_REDIRECT_URI`
//! - `LEADERBOARD_TOKEN_PATH`

use crate::auth::AuthConfig;
use crate::style::Tone;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub cognito_domain: String,
    pub cognito_client_id: String,
    /// Where the identity provider sends the user back after login.
    pub redirect_uri: String,
    /// Credential file; `None` means the platform config dir.
    pub token_path: Option<PathBuf>,
    pub tone: Tone,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".into(),
            cognito_domain: String::new(),
            cognito_client_id: String::new(),
            redirect_uri: "http://localhost:5173/".into(),
            token_path: None,
            tone: Tone::default(),
        }
    }
}

impl Config {
    /// Load `path` (if given), then apply the process environment. A path that
    /// was passed but cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let s = fs::read_to_string(p)
                    .with_context(|| format!("read config {}", p.display()))?;
                serde_json::from_str(&s).with_context(|| format!("parse config {}", p.display()))?
            }
            None => Config::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Override fields from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("LEADERBOARD_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = get("LEADERBOARD_COGNITO_DOMAIN") {
            self.cognito_domain = v;
        }
        if let Some(v) = get("LEADERBOARD_COGNITO_CLIENT_ID") {
            self.cognito_client_id = v;
        }
        if let Some(v) = get("LEADERBOARD_REDIRECT_URI") {
            self.redirect_uri = v;
        }
        if let Some(v) = get("LEADERBOARD_TOKEN_PATH") {
            self.token_path = Some(PathBuf::from(v));
        }
    }

    pub fn auth(&self) -> AuthConfig {
        AuthConfig::new(&self.cognito_domain, &self.cognito_client_id)
    }
}
