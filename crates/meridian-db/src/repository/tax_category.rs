//! # Tax Category Repository
//!
//! Database operations for store-scoped tax categories.
//!
//! ## Uniqueness
//! Category names are unique per store (`UNIQUE(store_id, name)`). The
//! get-or-create fallback path in the tax engine relies on this constraint:
//! its lookup-then-insert is not atomic, and the constraint makes a lost
//! race surface as a `UniqueViolation` instead of a duplicate category.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::TaxCategory;

const SELECT_COLUMNS: &str = "id, store_id, name, description, rate_bps, mode, is_active, \
                              created_at, updated_at";

/// Repository for tax category database operations.
#[derive(Debug, Clone)]
pub struct TaxCategoryRepository {
    pool: SqlitePool,
}

impl TaxCategoryRepository {
    /// Creates a new TaxCategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxCategoryRepository { pool }
    }

    /// Gets a tax category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TaxCategory>> {
        let category = sqlx::query_as::<_, TaxCategory>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tax_categories WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a tax category by its store-unique name.
    pub async fn get_by_store_and_name(
        &self,
        store_id: &str,
        name: &str,
    ) -> DbResult<Option<TaxCategory>> {
        let category = sqlx::query_as::<_, TaxCategory>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tax_categories WHERE store_id = ?1 AND name = ?2"
        ))
        .bind(store_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Checks whether a category with this name exists in the store.
    pub async fn exists_by_store_and_name(&self, store_id: &str, name: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tax_categories WHERE store_id = ?1 AND name = ?2",
        )
        .bind(store_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Lists all categories for a store, sorted by name.
    pub async fn list_by_store(&self, store_id: &str) -> DbResult<Vec<TaxCategory>> {
        let categories = sqlx::query_as::<_, TaxCategory>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tax_categories WHERE store_id = ?1 ORDER BY name"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Lists active categories for a store, sorted by name.
    pub async fn list_active_by_store(&self, store_id: &str) -> DbResult<Vec<TaxCategory>> {
        let categories = sqlx::query_as::<_, TaxCategory>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tax_categories \
             WHERE store_id = ?1 AND is_active = 1 ORDER BY name"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Inserts a new tax category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already taken in this store
    pub async fn insert(&self, category: &TaxCategory) -> DbResult<()> {
        debug!(id = %category.id, name = %category.name, "Inserting tax category");

        sqlx::query(
            r#"
            INSERT INTO tax_categories (
                id, store_id, name, description, rate_bps, mode, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&category.id)
        .bind(&category.store_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.rate_bps)
        .bind(category.mode)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates name, description, rate and mode of an existing category.
    pub async fn update(&self, category: &TaxCategory) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE tax_categories SET
                name = ?2,
                description = ?3,
                rate_bps = ?4,
                mode = ?5,
                is_active = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.rate_bps)
        .bind(category.mode)
        .bind(category.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax category", &category.id));
        }

        Ok(())
    }

    /// Activates or deactivates a category (soft delete).
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE tax_categories SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(active)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax category", id));
        }

        Ok(())
    }

    /// Hard-deletes a category.
    ///
    /// Normal flows deactivate instead; this exists for admin cleanup of
    /// categories that were never referenced.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tax_categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax category", id));
        }

        Ok(())
    }

    /// Counts categories in a store (for diagnostics and tests).
    pub async fn count_by_store(&self, store_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tax_categories WHERE store_id = ?1")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
