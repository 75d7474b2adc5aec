use super::{Listing, ListingPatch, ListingStore, ListingText, NewListing};
use crate::error::StoreError;
use crate::targets::TargetSet;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const BASE_COLUMNS: &str =
    "id, restaurant_name, description, opening_hours, address, amenities, created_at";

/// PostgreSQL-backed listing store.
///
/// Translation columns come from the configured target set; their names are
/// validated as plain identifiers when the set is built, and every write
/// checks fields against the set before any SQL is assembled.
#[derive(Clone)]
pub struct PgListingStore {
    pool: PgPool,
    targets: Arc<TargetSet>,
    select_columns: String,
}

impl PgListingStore {
    /// Connect and make sure the listings table has every translation column.
    pub async fn connect(database_url: &str, targets: Arc<TargetSet>) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self::with_pool(pool, targets);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn with_pool(pool: PgPool, targets: Arc<TargetSet>) -> Self {
        let select_columns = select_columns(&targets);
        Self {
            pool,
            targets,
            select_columns,
        }
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS listings (
                id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
                restaurant_name TEXT NOT NULL,
                description TEXT NOT NULL,
                opening_hours TEXT,
                address TEXT,
                amenities TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;

        for field in self.targets.storage_fields() {
            sqlx::query(&format!(
                "ALTER TABLE listings ADD COLUMN IF NOT EXISTS {} TEXT",
                field
            ))
            .execute(&self.pool)
            .await?;
        }

        info!(
            "✓ Listings schema ready ({} translation columns)",
            self.targets.len()
        );
        Ok(())
    }

    fn listing_from_row(&self, row: &PgRow) -> Result<Listing, sqlx::Error> {
        let mut translations = BTreeMap::new();
        for field in self.targets.storage_fields() {
            translations.insert(field.to_string(), row.try_get::<Option<String>, _>(field)?);
        }

        Ok(Listing {
            id: row.try_get("id")?,
            restaurant_name: row.try_get("restaurant_name")?,
            description: row.try_get("description")?,
            translations,
            opening_hours: row.try_get("opening_hours")?,
            address: row.try_get("address")?,
            amenities: row.try_get("amenities")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn select_columns(targets: &TargetSet) -> String {
    let mut columns = BASE_COLUMNS.to_string();
    for field in targets.storage_fields() {
        columns.push_str(", ");
        columns.push_str(field);
    }
    columns
}

/// Build the single UPDATE that writes translation columns for one listing.
fn translation_update_query<'a>(
    id: &'a str,
    fields: &'a BTreeMap<String, String>,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE listings SET ");
    {
        let mut assignments = builder.separated(", ");
        for (field, text) in fields {
            assignments.push(format!("{} = ", field));
            assignments.push_bind_unseparated(text.as_str());
        }
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn fetch_source_text(&self, id: &str) -> Result<ListingText, StoreError> {
        let row = sqlx::query("SELECT id, description FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(ListingText {
            id: row.try_get("id")?,
            source_text: row.try_get("description")?,
        })
    }

    async fn update_translation_fields(
        &self,
        id: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        if let Some(field) = fields.keys().find(|f| !self.targets.has_field(f)) {
            return Err(StoreError::UnknownField(field.clone()));
        }
        if fields.is_empty() {
            return Ok(());
        }

        let result = translation_update_query(id, fields)
            .build()
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listings ORDER BY created_at DESC",
            self.select_columns
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| self.listing_from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO listings (restaurant_name, description, opening_hours, address, amenities)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            self.select_columns
        ))
        .bind(&listing.restaurant_name)
        .bind(&listing.description)
        .bind(&listing.opening_hours)
        .bind(&listing.address)
        .bind(&listing.amenities)
        .fetch_one(&self.pool)
        .await?;

        Ok(self.listing_from_row(&row)?)
    }

    async fn update_listing(&self, id: &str, patch: &ListingPatch) -> Result<Listing, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE listings SET
                restaurant_name = COALESCE($2, restaurant_name),
                description = COALESCE($3, description),
                opening_hours = COALESCE($4, opening_hours),
                address = COALESCE($5, address),
                amenities = COALESCE($6, amenities)
             WHERE id = $1
             RETURNING {}",
            self.select_columns
        ))
        .bind(id)
        .bind(&patch.restaurant_name)
        .bind(&patch.description)
        .bind(&patch.opening_hours)
        .bind(&patch.address)
        .bind(&patch.amenities)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(self.listing_from_row(&row)?)
    }

    async fn delete_listing(&self, id: &str) -> Result<Listing, StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM listings WHERE id = $1 RETURNING {}",
            self.select_columns
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(self.listing_from_row(&row)?)
    }
}
