use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::COMPLETIONS_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Navigation menus.
    pub database_url: String,
    /// Settings store holding the published document.
    pub redis_url: String,
    /// Homepage fetched for the prior document in network mode.
    pub site_url: String,
    pub api_key_file: PathBuf,
    pub completions_url: String,
    /// When set, the prior document is captured from this markup instead of the live homepage.
    pub legacy_head_file: Option<PathBuf>,
    pub persist_generated: bool,
    pub competing_renderer: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            optional(key)
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            redis_url: require("REDIS_URL")?,
            site_url: require("SITE_URL")?,
            api_key_file: optional("API_KEY_FILE")
                .unwrap_or_else(|| ".key".to_string())
                .into(),
            completions_url: optional("COMPLETIONS_URL")
                .unwrap_or_else(|| COMPLETIONS_URL.to_string()),
            legacy_head_file: optional("LEGACY_HEAD_FILE").map(PathBuf::from),
            persist_generated: parse_bool(
                "PERSIST_GENERATED",
                var("PERSIST_GENERATED").as_deref(),
                true,
            )?,
            competing_renderer: optional("COMPETING_RENDERER")
                .unwrap_or_else(|| "rank_math".to_string()),
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_bool(key: &str, value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}
