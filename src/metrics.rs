//! Translation metrics and observability.
//!
//! Counters for which link of the provider chain served each target, how
//! often the engine fell back to the source text, and how batches ended.
//! Shared through an `Arc`; every counter is lock-free.

use crate::provider::ProviderUsed;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    primary_successes: AtomicUsize,
    secondary_successes: AtomicUsize,
    fallbacks: AtomicUsize,
    recovered_panics: AtomicUsize,
    batches_completed: AtomicUsize,
    persist_failures: AtomicUsize,
    dispatches_started: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record which provider produced one target's text.
    pub fn record_outcome(&self, provider: ProviderUsed) {
        let counter = match provider {
            ProviderUsed::Primary => &self.primary_successes,
            ProviderUsed::Secondary => &self.secondary_successes,
            ProviderUsed::Original => &self.fallbacks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a panic caught while translating one target.
    pub fn record_recovered_panic(&self) {
        self.recovered_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_completed(&self) {
        self.batches_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_started(&self) {
        self.dispatches_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn primary_successes(&self) -> usize {
        self.primary_successes.load(Ordering::Relaxed)
    }

    pub fn secondary_successes(&self) -> usize {
        self.secondary_successes.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn recovered_panics(&self) -> usize {
        self.recovered_panics.load(Ordering::Relaxed)
    }

    pub fn batches_completed(&self) -> usize {
        self.batches_completed.load(Ordering::Relaxed)
    }

    pub fn persist_failures(&self) -> usize {
        self.persist_failures.load(Ordering::Relaxed)
    }

    pub fn dispatches_started(&self) -> usize {
        self.dispatches_started.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let primary = self.primary_successes();
        let secondary = self.secondary_successes();
        let fallbacks = self.fallbacks();
        let total = primary + secondary + fallbacks;
        let translation_success_rate = if total > 0 {
            ((primary + secondary) as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            primary_successes: primary,
            secondary_successes: secondary,
            fallbacks,
            translation_success_rate,
            recovered_panics: self.recovered_panics(),
            batches_completed: self.batches_completed(),
            persist_failures: self.persist_failures(),
            dispatches_started: self.dispatches_started(),
        }
    }
}

/// Snapshot of the translation counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub primary_successes: usize,
    pub secondary_successes: usize,

    /// Targets that kept the source text because every provider failed
    pub fallbacks: usize,

    /// Share of targets translated by any provider, as a percentage (0-100)
    pub translation_success_rate: f64,

    pub recovered_panics: usize,
    pub batches_completed: usize,
    pub persist_failures: usize,
    pub dispatches_started: usize,
}
