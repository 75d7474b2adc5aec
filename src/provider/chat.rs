use super::TranslationProvider;
use crate::error::ProviderError;
use crate::targets::TranslationTarget;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER: &str = "Groq";

/// OpenAI-compatible chat completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Build the system prompt for translation
fn build_translation_system_prompt(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the following text from English to {}. \
         Return ONLY the translated text, no explanations or additional content. \
         Make the translation natural and contextually appropriate.",
        target_language
    )
}

/// Primary provider: an LLM behind an OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatCompletionProvider {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
            model: model.into(),
        }
    }

    fn build_request(&self, text: &str, language_name: &str) -> TranslationRequest {
        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_translation_system_prompt(language_name),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: 0.1,
            max_tokens: 1000,
            top_p: 1.0,
            stream: false,
        }
    }
}

#[async_trait]
impl TranslationProvider for ChatCompletionProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn translate(
        &self,
        text: &str,
        target: &TranslationTarget,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey { provider: PROVIDER })?;

        debug!("Requesting {} translation from {}", target.language_name, PROVIDER);

        let request = self.build_request(text, &target.language_name);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: e.to_string(),
            }
        })?;

        let translated = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if translated.is_empty() {
            return Err(ProviderError::EmptyTranslation { provider: PROVIDER });
        }

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn french() -> TranslationTarget {
        TranslationTarget::new("French", "fr", "description_fr")
    }

    fn create_provider(api_url: &str, api_key: Option<&str>) -> ChatCompletionProvider {
        ChatCompletionProvider::new(
            reqwest::Client::new(),
            api_url,
            api_key.map(str::to_string),
            "llama3-8b-8192",
        )
    }

    fn create_chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    // ==================== Prompt Tests ====================

    #[test]
    fn test_system_prompt_names_language() {
        let prompt = build_translation_system_prompt("Japanese");
        assert!(prompt.contains("from English to Japanese"));
        assert!(prompt.contains("Return ONLY the translated text"));
    }

    #[test]
    fn test_request_serialization() {
        let provider = create_provider("http://unused", Some("key"));
        let request = provider.build_request("Hello world", "Spanish");

        let json = serde_json::to_value(&request).expect("Should serialize");
        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Hello world");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["stream"], false);
    }

    // ==================== HTTP Tests with Wiremock ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-groq-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3-8b-8192",
                "messages": [
                    {"role": "system", "content": build_translation_system_prompt("French")},
                    {"role": "user", "content": "Welcome to our restaurant"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_chat_response("  Bienvenue dans notre restaurant\n")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_provider(
            &format!("{}/openai/v1/chat/completions", mock_server.uri()),
            Some("test-groq-key"),
        );

        let result = provider
            .translate("Welcome to our restaurant", &french())
            .await
            .expect("Should succeed");

        assert_eq!(result, "Bienvenue dans notre restaurant");
    }

    #[tokio::test]
    async fn test_translate_missing_key_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server.uri(), None);
        let result = provider.translate("Hello", &french()).await;

        assert!(matches!(result, Err(ProviderError::MissingApiKey { .. })));
    }

    #[tokio::test]
    async fn test_translate_non_2xx_is_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit reached"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server.uri(), Some("key"));
        let result = provider.translate("Hello", &french()).await;

        match result {
            Err(ProviderError::Status { status, body, .. }) => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server.uri(), Some("key"));
        let result = provider.translate("Hello", &french()).await;

        assert!(matches!(result, Err(ProviderError::EmptyTranslation { .. })));
    }

    #[tokio::test]
    async fn test_translate_whitespace_content_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_chat_response("   ")))
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server.uri(), Some("key"));
        let result = provider.translate("Hello", &french()).await;

        assert!(matches!(result, Err(ProviderError::EmptyTranslation { .. })));
    }

    #[tokio::test]
    async fn test_translate_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server.uri(), Some("key"));
        let result = provider.translate("Hello", &french()).await;

        assert!(matches!(result, Err(ProviderError::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn test_translate_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_chat_response("trop tard"))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = super::super::build_http_client(std::time::Duration::from_millis(50))
            .expect("client");
        let provider =
            ChatCompletionProvider::new(client, mock_server.uri(), Some("key".into()), "m");
        let result = provider.translate("Hello", &french()).await;

        assert!(matches!(result, Err(ProviderError::Timeout { .. })), "{:?}", result);
    }
}
