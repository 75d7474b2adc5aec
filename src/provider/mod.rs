//! Translation providers and the ordered chain the translator walks.
//!
//! - `chat`: LLM-backed primary provider (OpenAI-compatible chat completions, Groq by default)
//! - `mymemory`: statistical MT secondary provider

mod chat;
mod mymemory;

pub use chat::ChatCompletionProvider;
pub use mymemory::MyMemoryProvider;

use crate::error::ProviderError;
use crate::targets::TranslationTarget;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A stateless service that turns text into text in another language.
///
/// Implementations choose which selector of the target they send upstream:
/// the primary uses the language name, the secondary the language code.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Human-readable provider name for logs
    fn name(&self) -> &'static str;

    async fn translate(
        &self,
        text: &str,
        target: &TranslationTarget,
    ) -> Result<String, ProviderError>;
}

/// Which link of the chain produced a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderUsed {
    Primary,
    Secondary,
    /// No provider succeeded; the source text was kept
    Original,
}

impl fmt::Display for ProviderUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderUsed::Primary => write!(f, "primary"),
            ProviderUsed::Secondary => write!(f, "secondary"),
            ProviderUsed::Original => write!(f, "original"),
        }
    }
}

/// Primary provider first, secondary only when the primary fails.
#[derive(Clone)]
pub struct ProviderChain {
    primary: Arc<dyn TranslationProvider>,
    secondary: Arc<dyn TranslationProvider>,
}

impl ProviderChain {
    pub fn new(
        primary: Arc<dyn TranslationProvider>,
        secondary: Arc<dyn TranslationProvider>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Links in the order they must be tried.
    pub fn links(&self) -> [(ProviderUsed, &dyn TranslationProvider); 2] {
        [
            (ProviderUsed::Primary, self.primary.as_ref()),
            (ProviderUsed::Secondary, self.secondary.as_ref()),
        ]
    }
}

/// Shared HTTP client for all provider calls. The timeout bounds every call
/// so a stalled provider cannot hold a batch forever.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}
