use crate::metrics::TranslationMetrics;
use crate::provider::{ProviderChain, ProviderUsed};
use crate::targets::TranslationTarget;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of translating one text into one target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationOutcome {
    pub target: TranslationTarget,
    pub text: String,
    pub provider_used: ProviderUsed,
    pub succeeded: bool,
}

impl TranslationOutcome {
    /// Outcome for a target no provider could translate: the source text is kept.
    pub fn fallback(target: &TranslationTarget, source_text: &str) -> Self {
        Self {
            target: target.clone(),
            text: source_text.to_string(),
            provider_used: ProviderUsed::Original,
            succeeded: false,
        }
    }
}

/// Walks the provider chain for one (text, target) pair.
#[derive(Clone)]
pub struct LanguageTranslator {
    chain: ProviderChain,
    metrics: Arc<TranslationMetrics>,
}

impl LanguageTranslator {
    pub fn new(chain: ProviderChain, metrics: Arc<TranslationMetrics>) -> Self {
        Self { chain, metrics }
    }

    /// Translate `text` into `target`. Never fails: when every provider
    /// errors, the outcome carries the original text with `succeeded: false`.
    /// Each provider is called at most once.
    pub async fn translate(&self, text: &str, target: &TranslationTarget) -> TranslationOutcome {
        for (tier, provider) in self.chain.links() {
            info!(
                language = %target.language_name,
                provider = provider.name(),
                tier = %tier,
                "Translating"
            );

            match provider.translate(text, target).await {
                Ok(translated) => {
                    info!(
                        language = %target.language_name,
                        provider = provider.name(),
                        "✓ Translation succeeded"
                    );
                    self.metrics.record_outcome(tier);
                    return TranslationOutcome {
                        target: target.clone(),
                        text: translated,
                        provider_used: tier,
                        succeeded: true,
                    };
                }
                Err(e) => {
                    warn!(
                        language = %target.language_name,
                        provider = provider.name(),
                        "Translation failed: {}",
                        e
                    );
                }
            }
        }

        warn!(
            language = %target.language_name,
            "All providers failed, keeping original text"
        );
        self.metrics.record_outcome(ProviderUsed::Original);
        TranslationOutcome::fallback(target, text)
    }
}
