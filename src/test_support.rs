//! In-process provider fakes shared by unit tests.

use crate::error::ProviderError;
use crate::provider::TranslationProvider;
use crate::targets::TranslationTarget;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// What a scripted provider does for one language code.
#[derive(Debug, Clone)]
pub enum Script {
    Translate(String),
    Fail,
    Panic,
}

/// Provider that answers from a per-language script and records every call.
pub struct ScriptedProvider {
    name: &'static str,
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<(String, tokio::time::Instant)>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every call after recording it until `gate` has a permit.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with(mut self, language_code: &str, script: Script) -> Self {
        self.scripts.insert(language_code.to_string(), script);
        self
    }

    pub fn translating(self, language_code: &str, text: &str) -> Self {
        self.with(language_code, Script::Translate(text.to_string()))
    }

    pub fn failing(self, language_code: &str) -> Self {
        self.with(language_code, Script::Fail)
    }

    /// Language codes this provider was asked for, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(code, _)| code.clone())
            .collect()
    }

    pub fn call_instants(&self) -> Vec<tokio::time::Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn translate(
        &self,
        _text: &str,
        target: &TranslationTarget,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((target.language_code.clone(), tokio::time::Instant::now()));

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }

        match self.scripts.get(&target.language_code) {
            Some(Script::Translate(text)) => Ok(text.clone()),
            Some(Script::Panic) => panic!("scripted panic for {}", target.language_code),
            Some(Script::Fail) | None => Err(ProviderError::Status {
                provider: self.name,
                status: 500,
                body: "scripted failure".to_string(),
            }),
        }
    }
}
