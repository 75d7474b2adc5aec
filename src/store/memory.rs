use super::{Listing, ListingPatch, ListingStore, ListingText, NewListing};
use crate::error::StoreError;
use crate::targets::TargetSet;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    listings: HashMap<String, Listing>,
    next_id: u64,
}

/// Process-local listing store. Used when no database is configured and in tests.
pub struct MemoryListingStore {
    targets: Arc<TargetSet>,
    inner: Mutex<Inner>,
}

impl MemoryListingStore {
    pub fn new(targets: Arc<TargetSet>) -> Self {
        Self {
            targets,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Fetch a full listing by id.
    pub async fn get(&self, id: &str) -> Option<Listing> {
        self.inner.lock().await.listings.get(id).cloned()
    }
}

/// Insertion order of a listing; ids are a decimal counter.
fn sequence(listing: &Listing) -> u64 {
    listing.id.parse().unwrap_or(0)
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn fetch_source_text(&self, id: &str) -> Result<ListingText, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .listings
            .get(id)
            .map(|l| ListingText {
                id: l.id.clone(),
                source_text: l.description.clone(),
            })
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_translation_fields(
        &self,
        id: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        if let Some(field) = fields.keys().find(|f| !self.targets.has_field(f)) {
            return Err(StoreError::UnknownField(field.clone()));
        }

        let mut inner = self.inner.lock().await;
        let listing = inner
            .listings
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        for (field, text) in fields {
            listing
                .translations
                .insert(field.clone(), Some(text.clone()));
        }

        Ok(())
    }

    async fn list_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let inner = self.inner.lock().await;
        let mut listings: Vec<Listing> = inner.listings.values().cloned().collect();
        listings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| sequence(b).cmp(&sequence(a)))
        });
        Ok(listings)
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = inner.next_id.to_string();

        let created = Listing {
            id: id.clone(),
            restaurant_name: listing.restaurant_name.clone(),
            description: listing.description.clone(),
            translations: self
                .targets
                .iter()
                .map(|t| (t.storage_field.clone(), None))
                .collect(),
            opening_hours: listing.opening_hours.clone(),
            address: listing.address.clone(),
            amenities: listing.amenities.clone(),
            created_at: Utc::now(),
        };

        inner.listings.insert(id, created.clone());
        Ok(created)
    }

    async fn update_listing(&self, id: &str, patch: &ListingPatch) -> Result<Listing, StoreError> {
        let mut inner = self.inner.lock().await;
        let listing = inner
            .listings
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(name) = &patch.restaurant_name {
            listing.restaurant_name = name.clone();
        }
        if let Some(description) = &patch.description {
            listing.description = description.clone();
        }
        if let Some(hours) = &patch.opening_hours {
            listing.opening_hours = Some(hours.clone());
        }
        if let Some(address) = &patch.address {
            listing.address = Some(address.clone());
        }
        if let Some(amenities) = &patch.amenities {
            listing.amenities = amenities.clone();
        }

        Ok(listing.clone())
    }

    async fn delete_listing(&self, id: &str) -> Result<Listing, StoreError> {
        self.inner
            .lock()
            .await
            .listings
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
