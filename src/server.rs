//! Admin HTTP surface: listing CRUD with automatic translation, the manual
//! translate trigger, health and metrics.

use crate::change::ChangeDecision;
use crate::dispatcher::Dispatcher;
use crate::engine::TranslationEngine;
use crate::error::{EngineError, StoreError};
use crate::metrics::{MetricsReport, TranslationMetrics};
use crate::orchestrator::TranslationBatchResult;
use crate::store::{Listing, ListingPatch, ListingStore, NewListing};
use crate::targets::LanguageSelection;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub struct AppState {
    pub store: Arc<dyn ListingStore>,
    pub engine: Arc<TranslationEngine>,
    pub dispatcher: Dispatcher,
    pub metrics: Arc<TranslationMetrics>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate))
        .route("/admin/listings", get(list_listings).post(create_listing))
        .route(
            "/admin/listings/:id",
            put(update_listing).delete(delete_listing),
        )
        .route("/admin/listings/:id/translate", post(translate_listing))
        .route("/admin/translation/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response: a status code and a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match &err {
            EngineError::ListingNotFound(_) => StatusCode::NOT_FOUND,
            EngineError::EmptySourceText(_) | EngineError::UnsupportedLanguage { .. } => {
                StatusCode::BAD_REQUEST
            }
            EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            other => {
                error!("Storage error: {}", other);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsReport> {
    Json(state.metrics.report())
}

async fn list_listings(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Listing>>, ApiError> {
    Ok(Json(state.store.list_listings().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub restaurant_name: Option<String>,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

async fn create_listing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (restaurant_name, description) = match (request.restaurant_name, request.description) {
        (Some(name), Some(description)) if !name.trim().is_empty() && !description.is_empty() => {
            (name, description)
        }
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "restaurant_name and description are required",
            ))
        }
    };

    let listing = state
        .store
        .insert_listing(&NewListing {
            restaurant_name,
            description,
            opening_hours: request.opening_hours,
            address: request.address,
            amenities: request.amenities,
        })
        .await?;

    info!("📝 New listing created: {}", listing.id);

    let decision = ChangeDecision::evaluate(None, Some(&listing.description));
    if decision.should_translate {
        state
            .dispatcher
            .fire_and_forget(&listing.id, &listing.description);
    }

    let (message, status) = if decision.should_translate {
        ("Listing created, translations in progress...", "in_progress")
    } else {
        ("Listing created", "skipped")
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": message,
            "listing": listing,
            "translation_status": status,
        })),
    ))
}

async fn update_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ListingPatch>,
) -> Result<Json<Value>, ApiError> {
    // Read the stored text before the write so the comparison sees the old value
    let previous = state.store.fetch_source_text(&id).await?;

    let listing = state.store.update_listing(&id, &patch).await?;

    let decision =
        ChangeDecision::evaluate(Some(&previous.source_text), patch.description.as_deref());
    if decision.should_translate {
        info!("🔄 Description changed for {}, triggering retranslation", id);
        state
            .dispatcher
            .fire_and_forget(&listing.id, &listing.description);
    }

    let (message, status) = if decision.should_translate {
        ("Listing updated, translations in progress...", "in_progress")
    } else {
        ("Listing updated", "unchanged")
    };

    Ok(Json(json!({
        "message": message,
        "listing": listing,
        "translation_status": status,
    })))
}

async fn delete_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let listing = state.store.delete_listing(&id).await?;
    Ok(Json(json!({ "message": "Listing deleted", "listing": listing })))
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslateRequest {
    pub listing_id: Option<String>,
    pub lang: Option<String>,
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<Value>, ApiError> {
    let listing_id = request
        .listing_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "listing_id is required"))?;

    run_manual_translation(&state, &listing_id, request.lang.as_deref()).await
}

async fn translate_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request = parse_optional_body(&body)?;
    run_manual_translation(&state, &id, request.lang.as_deref()).await
}

/// An absent body selects every language; anything else must be a valid request.
fn parse_optional_body(body: &[u8]) -> Result<TranslateRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TranslateRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e),
        )
    })
}

async fn run_manual_translation(
    state: &AppState,
    listing_id: &str,
    lang: Option<&str>,
) -> Result<Json<Value>, ApiError> {
    let selection = LanguageSelection::from_param(lang);
    info!(
        "🌍 Manual translation requested for listing {} ({:?})",
        listing_id, selection
    );

    let result = state
        .engine
        .translate_listing(listing_id, &selection)
        .await
        .map_err(|e| {
            error!("Manual translation failed for {}: {}", listing_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(match selection {
        LanguageSelection::All => all_languages_body(&result),
        LanguageSelection::Single(_) => single_language_body(&result),
    }))
}

fn all_languages_body(result: &TranslationBatchResult) -> Value {
    let success = result.any_succeeded();
    let message = if success {
        format!(
            "Translated {}/{} languages",
            result.succeeded_count(),
            result.len()
        )
    } else {
        "No provider could translate the listing; original text kept for every language"
            .to_string()
    };
    let languages: Vec<_> = result
        .outcomes()
        .iter()
        .map(|o| o.target.language_name.to_lowercase())
        .collect();

    json!({
        "success": success,
        "message": message,
        "translations": result.translations(),
        "languages_processed": languages,
        "outcomes": result.outcomes(),
    })
}

fn single_language_body(result: &TranslationBatchResult) -> Value {
    match result.outcomes().first() {
        Some(outcome) => json!({
            "success": outcome.succeeded,
            "translatedText": outcome.text,
            "language": outcome.target.language_name.to_lowercase(),
            "providerUsed": outcome.provider_used,
        }),
        None => json!({ "success": false }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_selects_all_languages() {
        let bodies: [&[u8]; 2] = [b"", b"  \n"];
        for body in bodies {
            let request = parse_optional_body(body).expect("empty body is allowed");
            assert!(request.lang.is_none());
        }
    }

    #[test]
    fn test_body_with_language() {
        let request = parse_optional_body(br#"{"lang": "fr"}"#).unwrap();
        assert_eq!(request.lang.as_deref(), Some("fr"));
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let bodies: [&[u8]; 3] = [br#"{"lang": "klingon"#, br#"{"lang": 5}"#, b"lang=fr"];
        for body in bodies {
            let err = parse_optional_body(body).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert!(err.message.starts_with("Invalid request body"));
        }
    }
}
