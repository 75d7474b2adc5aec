use super::TranslationProvider;
use crate::error::ProviderError;
use crate::targets::TranslationTarget;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const PROVIDER: &str = "MyMemory";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    #[serde(default)]
    response_status: Option<serde_json::Value>,
    #[serde(default)]
    response_data: Option<ResponseData>,
    #[serde(default)]
    response_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    #[serde(default)]
    translated_text: Option<String>,
}

/// MyMemory reports its status either as a number or a numeric string.
fn status_is_ok(status: &serde_json::Value) -> bool {
    match status {
        serde_json::Value::Number(n) => n.as_u64() == Some(200),
        serde_json::Value::String(s) => s.trim() == "200",
        _ => false,
    }
}

/// Secondary provider: the MyMemory translation memory / MT service.
pub struct MyMemoryProvider {
    client: reqwest::Client,
    base_url: String,
    source_language_code: String,
}

impl MyMemoryProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        source_language_code: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            source_language_code: source_language_code.into(),
        }
    }

    fn lang_pair(&self, target_code: &str) -> String {
        format!("{}|{}", self.source_language_code, target_code)
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn translate(
        &self,
        text: &str,
        target: &TranslationTarget,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/get", self.base_url.trim_end_matches('/'));
        let lang_pair = self.lang_pair(&target.language_code);

        debug!("Requesting {} translation from {}", lang_pair, PROVIDER);

        let response = self
            .client
            .get(&url)
            .query(&[("q", text), ("langpair", lang_pair.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let body: MyMemoryResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: e.to_string(),
            }
        })?;

        let status = body
            .response_status
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: "missing responseStatus".to_string(),
            })?;

        let translated = body
            .response_data
            .and_then(|d| d.translated_text)
            .filter(|t| !t.trim().is_empty());

        match translated {
            Some(text) if status_is_ok(&status) => Ok(text),
            _ => {
                let details = body
                    .response_details
                    .map(|d| match d {
                        serde_json::Value::String(s) if !s.is_empty() => s,
                        serde_json::Value::Null => "Unknown error".to_string(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "Unknown error".to_string());
                Err(ProviderError::Rejected {
                    provider: PROVIDER,
                    details,
                })
            }
        }
    }
}
