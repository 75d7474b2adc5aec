use crate::config::Config;
use crate::error::EngineError;
use crate::metrics::TranslationMetrics;
use crate::orchestrator::{BatchOrchestrator, TranslationBatchResult};
use crate::provider::{build_http_client, ChatCompletionProvider, MyMemoryProvider, ProviderChain};
use crate::store::ListingStore;
use crate::sync::PersistenceSync;
use crate::targets::{LanguageSelection, TargetSet, TranslationTarget};
use crate::throttle::Throttle;
use crate::translator::LanguageTranslator;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Ties the orchestrator to storage: read, translate, persist.
pub struct TranslationEngine {
    store: Arc<dyn ListingStore>,
    orchestrator: BatchOrchestrator,
    sync: PersistenceSync,
    targets: Arc<TargetSet>,
}

impl TranslationEngine {
    pub fn new(
        store: Arc<dyn ListingStore>,
        chain: ProviderChain,
        throttle: Arc<Throttle>,
        targets: Arc<TargetSet>,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        let translator = LanguageTranslator::new(chain, Arc::clone(&metrics));
        let orchestrator = BatchOrchestrator::new(translator, throttle, Arc::clone(&metrics));
        let sync = PersistenceSync::new(Arc::clone(&store), Arc::clone(&targets), metrics);

        Self {
            store,
            orchestrator,
            sync,
            targets,
        }
    }

    /// Build the engine with the Groq primary and MyMemory secondary providers.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn ListingStore>,
        metrics: Arc<TranslationMetrics>,
    ) -> Result<Self> {
        let client =
            build_http_client(config.provider_timeout).context("Failed to build HTTP client")?;

        let primary = ChatCompletionProvider::new(
            client.clone(),
            &config.groq_api_url,
            config.groq_api_key.clone(),
            &config.groq_model,
        );
        let secondary = MyMemoryProvider::new(
            client,
            &config.mymemory_api_url,
            &config.source_language_code,
        );

        Ok(Self::new(
            store,
            ProviderChain::new(Arc::new(primary), Arc::new(secondary)),
            Arc::new(Throttle::new(config.throttle_interval)),
            Arc::new(config.targets.clone()),
            metrics,
        ))
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Resolve a selection to the targets it covers.
    pub fn resolve(
        &self,
        selection: &LanguageSelection,
    ) -> Result<Vec<TranslationTarget>, EngineError> {
        match selection {
            LanguageSelection::All => Ok(self.targets.as_slice().to_vec()),
            LanguageSelection::Single(lang) => self
                .targets
                .find(lang)
                .map(|t| vec![t.clone()])
                .ok_or_else(|| EngineError::UnsupportedLanguage {
                    lang: lang.clone(),
                    supported: self.targets.language_names(),
                }),
        }
    }

    /// Read the listing's stored text, translate it, and persist the result.
    pub async fn translate_listing(
        &self,
        listing_id: &str,
        selection: &LanguageSelection,
    ) -> Result<TranslationBatchResult, EngineError> {
        let targets = self.resolve(selection)?;
        let listing = self.store.fetch_source_text(listing_id).await?;
        self.run(&listing.id, &listing.source_text, &targets).await
    }

    /// Translate text the caller already holds (typically just written) and persist it.
    pub async fn translate_text(
        &self,
        listing_id: &str,
        text: &str,
        selection: &LanguageSelection,
    ) -> Result<TranslationBatchResult, EngineError> {
        let targets = self.resolve(selection)?;
        self.run(listing_id, text, &targets).await
    }

    async fn run(
        &self,
        listing_id: &str,
        text: &str,
        targets: &[TranslationTarget],
    ) -> Result<TranslationBatchResult, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptySourceText(listing_id.to_string()));
        }

        let preview: String = text.chars().take(100).collect();
        info!("📝 Translating listing {}: \"{}\"", listing_id, preview);

        let result = self.orchestrator.translate_all(text, targets).await;

        self.sync
            .apply(listing_id, &result)
            .await
            .map_err(EngineError::Storage)?;

        Ok(result)
    }
}
