use crate::targets::TargetSet;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Database (in-memory store when unset)
    pub database_url: Option<String>,

    // Primary provider (OpenAI-compatible chat completions, Groq by default)
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_api_url: String,

    // Secondary provider (MyMemory)
    pub mymemory_api_url: String,
    pub source_language_code: String,

    // Pacing and limits
    pub throttle_interval: Duration,
    pub provider_timeout: Duration,
    pub max_concurrent_dispatches: usize,

    // Languages
    pub targets: TargetSet,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let targets = match std::env::var("TRANSLATION_TARGETS") {
            Ok(spec) if !spec.trim().is_empty() => TargetSet::parse(&spec)?,
            _ => TargetSet::defaults(),
        };

        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .map(|v| v.parse().context("PORT must be a valid port number"))
                .transpose()?
                .unwrap_or(8080),

            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            groq_api_key: std::env::var("GROQ_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            groq_model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama3-8b-8192".to_string()),
            groq_api_url: std::env::var("GROQ_API_URL").unwrap_or_else(|_| {
                "https://api.groq.com/openai/v1/chat/completions".to_string()
            }),

            mymemory_api_url: std::env::var("MYMEMORY_API_URL")
                .unwrap_or_else(|_| "https://api.mymemory.translated.net".to_string()),
            source_language_code: std::env::var("SOURCE_LANGUAGE_CODE")
                .unwrap_or_else(|_| "en".to_string()),

            throttle_interval: Duration::from_millis(
                std::env::var("TRANSLATION_THROTTLE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(200),
            ),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(30),
            ),
            max_concurrent_dispatches: std::env::var("MAX_CONCURRENT_DISPATCHES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(4),

            targets,
        })
    }
}
