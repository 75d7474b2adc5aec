use crate::error::StoreError;
use crate::metrics::TranslationMetrics;
use crate::orchestrator::TranslationBatchResult;
use crate::store::ListingStore;
use crate::targets::TargetSet;
use std::sync::Arc;
use tracing::{error, info};

/// Writes a batch result back to its listing as one partial update.
#[derive(Clone)]
pub struct PersistenceSync {
    store: Arc<dyn ListingStore>,
    targets: Arc<TargetSet>,
    metrics: Arc<TranslationMetrics>,
}

impl PersistenceSync {
    pub fn new(
        store: Arc<dyn ListingStore>,
        targets: Arc<TargetSet>,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            store,
            targets,
            metrics,
        }
    }

    /// Apply every translation of `result` to listing `listing_id`.
    ///
    /// Only configured translation fields are written. Re-applying the same
    /// result leaves the row unchanged. Failures are logged and returned; there
    /// is no retry.
    pub async fn apply(
        &self,
        listing_id: &str,
        result: &TranslationBatchResult,
    ) -> Result<(), StoreError> {
        let fields = result.translations();

        if let Some(field) = fields.keys().find(|f| !self.targets.has_field(f)) {
            error!("Refusing to write unknown translation field '{}'", field);
            self.metrics.record_persist_failure();
            return Err(StoreError::UnknownField(field.clone()));
        }

        if fields.is_empty() {
            return Ok(());
        }

        info!(
            "💾 Updating listing {} with {} translations",
            listing_id,
            fields.len()
        );

        match self.store.update_translation_fields(listing_id, fields).await {
            Ok(()) => {
                info!("✓ Translations saved for listing {}", listing_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to update translations for {}: {}", listing_id, e);
                self.metrics.record_persist_failure();
                Err(e)
            }
        }
    }
}
