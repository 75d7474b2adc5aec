use crate::metrics::TranslationMetrics;
use crate::provider::ProviderUsed;
use crate::targets::TranslationTarget;
use crate::throttle::Throttle;
use crate::translator::{LanguageTranslator, TranslationOutcome};
use futures::FutureExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

/// Translations for every target of one run, keyed by storage field.
///
/// Holds exactly one entry per target the run was given; an entry is never
/// empty as long as the source text was not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationBatchResult {
    translations: BTreeMap<String, String>,
    outcomes: Vec<TranslationOutcome>,
}

impl TranslationBatchResult {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            translations: BTreeMap::new(),
            outcomes: Vec::with_capacity(capacity),
        }
    }

    fn record(&mut self, outcome: TranslationOutcome) {
        self.translations
            .insert(outcome.target.storage_field.clone(), outcome.text.clone());
        self.outcomes.push(outcome);
    }

    /// Storage field → text mapping handed to persistence.
    pub fn translations(&self) -> &BTreeMap<String, String> {
        &self.translations
    }

    pub fn get(&self, storage_field: &str) -> Option<&str> {
        self.translations.get(storage_field).map(String::as_str)
    }

    /// Per-target outcomes in configured order.
    pub fn outcomes(&self) -> &[TranslationOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// True when at least one target was translated by a provider.
    pub fn any_succeeded(&self) -> bool {
        self.outcomes.iter().any(|o| o.succeeded)
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }
}

/// Runs the language translator over an ordered target list, one target at a time.
#[derive(Clone)]
pub struct BatchOrchestrator {
    translator: LanguageTranslator,
    throttle: Arc<Throttle>,
    metrics: Arc<TranslationMetrics>,
}

impl BatchOrchestrator {
    pub fn new(
        translator: LanguageTranslator,
        throttle: Arc<Throttle>,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            translator,
            throttle,
            metrics,
        }
    }

    /// Translate `text` into every target, sequentially and in order.
    ///
    /// Each target is attempted exactly once. A panic while translating one
    /// target is contained: that target keeps the source text and the batch
    /// moves on.
    pub async fn translate_all(
        &self,
        text: &str,
        targets: &[TranslationTarget],
    ) -> TranslationBatchResult {
        info!("Starting translation batch for {} languages", targets.len());

        let mut result = TranslationBatchResult::with_capacity(targets.len());

        for target in targets {
            self.throttle.wait().await;

            let outcome = match AssertUnwindSafe(self.translator.translate(text, target))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => {
                    error!(
                        language = %target.language_name,
                        "💥 Critical error while translating: {}",
                        panic_message(panic.as_ref())
                    );
                    self.metrics.record_recovered_panic();
                    self.metrics.record_outcome(ProviderUsed::Original);
                    TranslationOutcome::fallback(target, text)
                }
            };

            result.record(outcome);
        }

        self.metrics.record_batch_completed();
        info!(
            "Translation batch finished: {}/{} languages translated",
            result.succeeded_count(),
            targets.len()
        );

        result
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
