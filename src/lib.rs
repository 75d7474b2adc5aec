//! Listing translation service.
//!
//! Translates a restaurant listing's description into every configured
//! language: an LLM provider is tried first, a statistical MT provider second,
//! and the original text is kept when both fail. Runs are triggered in the
//! background whenever a listing's description changes, or on demand.

pub mod change;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod provider;
pub mod server;
pub mod store;
pub mod sync;
pub mod targets;
pub mod throttle;
pub mod translator;

#[cfg(test)]
mod test_support;
