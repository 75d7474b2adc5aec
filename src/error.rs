use thiserror::Error;

/// Failure of a single provider call. Recovered by the fallback chain, never
/// surfaced past the language translator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("{provider} request timed out")]
    Timeout { provider: &'static str },

    #[error("Failed to reach {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed {provider} response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} returned an empty translation")]
    EmptyTranslation { provider: &'static str },

    #[error("{provider} rejected the request: {details}")]
    Rejected {
        provider: &'static str,
        details: String,
    },
}

impl ProviderError {
    /// Classify a reqwest send/read error, separating timeouts from other transport failures.
    pub fn from_reqwest(provider: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProviderError::Timeout { provider }
        } else {
            ProviderError::Transport { provider, source }
        }
    }
}

/// Failure talking to listing storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Listing {0} not found")]
    NotFound(String),

    #[error("'{0}' is not a configured translation field")]
    UnknownField(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Request-level failure of a translation run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Listing {0} not found")]
    ListingNotFound(String),

    #[error("Listing {0} has no description to translate")]
    EmptySourceText(String),

    #[error("Language '{lang}' not supported. Supported languages: {}", supported.join(", "))]
    UnsupportedLanguage { lang: String, supported: Vec<String> },

    #[error("Failed to update translations: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => EngineError::ListingNotFound(id),
            other => EngineError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mentions_code_and_body() {
        let err = ProviderError::Status {
            provider: "Groq",
            status: 429,
            body: "rate limited".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
        assert!(msg.contains("Groq"));
    }

    #[test]
    fn test_unsupported_language_lists_supported() {
        let err = EngineError::UnsupportedLanguage {
            lang: "klingon".to_string(),
            supported: vec!["french".to_string(), "spanish".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Language 'klingon' not supported. Supported languages: french, spanish"
        );
    }

    #[test]
    fn test_store_not_found_maps_to_listing_not_found() {
        let err: EngineError = StoreError::NotFound("42".to_string()).into();
        assert!(matches!(err, EngineError::ListingNotFound(id) if id == "42"));
    }

    #[test]
    fn test_store_unknown_field_maps_to_storage() {
        let err: EngineError = StoreError::UnknownField("x".to_string()).into();
        assert!(matches!(err, EngineError::Storage(StoreError::UnknownField(_))));
    }
}
