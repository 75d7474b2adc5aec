//! Listing storage.
//!
//! The translation engine only reads a listing's source text and writes its
//! translation columns. The remaining operations back the admin CRUD routes.

mod memory;
mod postgres;

pub use memory::MemoryListingStore;
pub use postgres::PgListingStore;

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The minimal view of a listing the engine needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingText {
    pub id: String,
    pub source_text: String,
}

/// A listing row with all its translations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: String,
    pub restaurant_name: String,
    pub description: String,
    /// Translation columns keyed by storage field; `None` until first translated
    #[serde(flatten)]
    pub translations: BTreeMap<String, Option<String>>,
    pub opening_hours: Option<String>,
    pub address: Option<String>,
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for creating a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub restaurant_name: String,
    pub description: String,
    pub opening_hours: Option<String>,
    pub address: Option<String>,
    pub amenities: Vec<String>,
}

/// Partial update of a listing's editable fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingPatch {
    pub restaurant_name: Option<String>,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub address: Option<String>,
    pub amenities: Option<Vec<String>>,
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Read a listing's source text.
    async fn fetch_source_text(&self, id: &str) -> Result<ListingText, StoreError>;

    /// Write translation columns of one listing in a single update. Never
    /// touches the source text.
    async fn update_translation_fields(
        &self,
        id: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), StoreError>;

    /// All listings, newest first.
    async fn list_listings(&self) -> Result<Vec<Listing>, StoreError>;

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing, StoreError>;

    async fn update_listing(&self, id: &str, patch: &ListingPatch) -> Result<Listing, StoreError>;

    async fn delete_listing(&self, id: &str) -> Result<Listing, StoreError>;
}
