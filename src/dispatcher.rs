use crate::engine::TranslationEngine;
use crate::metrics::TranslationMetrics;
use crate::targets::LanguageSelection;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{oneshot, Semaphore};
use tracing::{error, info};

/// How a detached translation run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Completed { translated: usize, total: usize },
    Failed(String),
}

/// Completion channel of a dispatched run. Dropping it does not affect the run.
#[derive(Debug)]
pub struct DispatchHandle {
    completion: oneshot::Receiver<DispatchStatus>,
}

impl DispatchHandle {
    /// Wait for the run to finish. `None` if the task died before reporting.
    pub async fn completed(self) -> Option<DispatchStatus> {
        self.completion.await.ok()
    }
}

/// Starts translation runs in the background after listing writes.
///
/// Runs are spawned on the tokio runtime and capped by a semaphore. The
/// caller never waits: the permit is acquired inside the spawned task.
/// Dispatches for the same listing are not coalesced.
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<TranslationEngine>,
    permits: Arc<Semaphore>,
    metrics: Arc<TranslationMetrics>,
}

impl Dispatcher {
    pub fn new(
        engine: Arc<TranslationEngine>,
        max_concurrent: usize,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            metrics,
        }
    }

    /// Translate `text` into every target for `listing_id` and persist it,
    /// without blocking the caller. Failures are logged, never returned.
    pub fn fire_and_forget(&self, listing_id: &str, text: &str) -> DispatchHandle {
        let (tx, rx) = oneshot::channel();
        let engine = Arc::clone(&self.engine);
        let permits = Arc::clone(&self.permits);
        let id = listing_id.to_string();
        let text = text.to_string();

        self.metrics.record_dispatch_started();
        info!("🔄 Triggering translation for listing: {}", id);

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Translation dispatcher closed for {}: {}", id, e);
                    let _ = tx.send(DispatchStatus::Failed(e.to_string()));
                    return;
                }
            };

            let run = engine.translate_text(&id, &text, &LanguageSelection::All);
            let status = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(Ok(result)) => {
                    let translated = result.succeeded_count();
                    let total = result.len();
                    info!(
                        "✓ Translation finished for {} ({}/{} languages translated)",
                        id, translated, total
                    );
                    DispatchStatus::Completed { translated, total }
                }
                Ok(Err(e)) => {
                    error!("Translation error (non-blocking) for {}: {}", id, e);
                    DispatchStatus::Failed(e.to_string())
                }
                Err(_) => {
                    error!("💥 Translation task panicked for {}", id);
                    DispatchStatus::Failed("translation task panicked".to_string())
                }
            };

            let _ = tx.send(status);
        });

        DispatchHandle { completion: rx }
    }
}
