//! # Tax Service
//!
//! Order and product tax calculation plus tax category management.
//!
//! ## Effective Category Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Effective Tax Category per Product                      │
//! │                                                                         │
//! │  product.tax_exempt? ──yes──► line skipped entirely                    │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  product.tax_category_id? ──set──► that category                       │
//! │       │ none                                                            │
//! │       ▼                                                                 │
//! │  branch.default_tax_bps (18% when unset)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get-or-create fallback category "Tax <rate>%"                         │
//! │    lookup (store, name) → insert → on UNIQUE violation refetch         │
//! │    the concurrent winner                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fallback categories are real persisted categories, so the breakdown rows
//! of an order always reference a row in tax_categories.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{PosError, PosResult};
use crate::repository::branch::BranchRepository;
use crate::repository::generate_id;
use crate::repository::product::ProductRepository;
use crate::repository::tax_category::TaxCategoryRepository;
use meridian_core::tax::{
    self, fallback_category_name, DEFAULT_TAX_CATEGORIES, STANDARD_RATE_NAME,
};
use meridian_core::validation::{validate_category_name, validate_rate_bps};
use meridian_core::{
    CoreError, Money, TaxCalculationResult, TaxCategory, TaxMode, TaxRate, TaxableLine,
};

/// Service for tax calculation and tax category management.
#[derive(Debug, Clone)]
pub struct TaxService {
    pool: SqlitePool,
}

impl TaxService {
    /// Creates a new TaxService.
    pub fn new(pool: SqlitePool) -> Self {
        TaxService { pool }
    }

    fn categories(&self) -> TaxCategoryRepository {
        TaxCategoryRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Calculation
    // =========================================================================

    /// Calculates the tax for a set of order lines at a branch.
    ///
    /// Lines are grouped by effective category before any tax is computed,
    /// so rounding happens once per category rather than once per line.
    /// Tax-exempt products are skipped and contribute to neither the tax
    /// nor the taxable amount.
    ///
    /// The result is transient; the caller snapshots it onto the order.
    pub async fn calculate_order_tax(
        &self,
        branch_id: &str,
        lines: &[TaxableLine],
    ) -> PosResult<TaxCalculationResult> {
        let branch = BranchRepository::new(self.pool.clone())
            .get_by_id(branch_id)
            .await?
            .ok_or_else(|| CoreError::BranchNotFound(branch_id.to_string()))?;

        let products = ProductRepository::new(self.pool.clone());
        let mut resolved: Vec<(TaxCategory, Money)> = Vec::with_capacity(lines.len());

        for line in lines {
            let product = products
                .get_by_id(&line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if product.tax_exempt {
                continue;
            }

            let category = self
                .effective_category(&product, &branch.store_id, branch.default_tax_rate())
                .await?;

            resolved.push((category, Money::from_cents(line.line_total_cents)));
        }

        let result = tax::calculate(&resolved);

        debug!(
            branch_id = %branch_id,
            lines = lines.len(),
            categories = result.breakdown.len(),
            total_tax_cents = result.total_tax.cents(),
            "Order tax calculated"
        );

        Ok(result)
    }

    /// Calculates the tax on `quantity` units of one product, priced at
    /// the current selling price.
    ///
    /// Exempt products always yield zero.
    pub async fn calculate_product_tax(
        &self,
        branch_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> PosResult<Money> {
        let branch = BranchRepository::new(self.pool.clone())
            .get_by_id(branch_id)
            .await?
            .ok_or_else(|| CoreError::BranchNotFound(branch_id.to_string()))?;

        let product = ProductRepository::new(self.pool.clone())
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if product.tax_exempt {
            return Ok(Money::zero());
        }

        let category = self
            .effective_category(&product, &branch.store_id, branch.default_tax_rate())
            .await?;

        let gross = product.selling_price().multiply_quantity(quantity);
        Ok(category.tax_amount(gross))
    }

    /// Resolves the category that applies to a product: its assigned one,
    /// or the branch-rate fallback.
    async fn effective_category(
        &self,
        product: &meridian_core::Product,
        store_id: &str,
        branch_rate: TaxRate,
    ) -> PosResult<TaxCategory> {
        match &product.tax_category_id {
            Some(category_id) => self
                .categories()
                .get_by_id(category_id)
                .await?
                .ok_or_else(|| CoreError::TaxCategoryNotFound(category_id.clone()).into()),
            None => self.get_or_create_fallback(store_id, branch_rate).await,
        }
    }

    /// Gets the auto-generated category for a rate, creating it on first
    /// use. The generated name doubles as the idempotency key: a lost
    /// insert race surfaces as a UNIQUE violation and the winner's row is
    /// fetched instead.
    pub async fn get_or_create_fallback(
        &self,
        store_id: &str,
        rate: TaxRate,
    ) -> PosResult<TaxCategory> {
        let name = fallback_category_name(rate);
        let repo = self.categories();

        if let Some(existing) = repo.get_by_store_and_name(store_id, &name).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let category = TaxCategory {
            id: generate_id(),
            store_id: store_id.to_string(),
            name: name.clone(),
            description: None,
            rate_bps: rate.bps(),
            mode: TaxMode::Exclusive,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        match repo.insert(&category).await {
            Ok(()) => {
                info!(store_id = %store_id, name = %name, "Created fallback tax category");
                Ok(category)
            }
            Err(err) if err.is_unique_violation() => {
                debug!(store_id = %store_id, name = %name, "Lost fallback creation race, refetching");
                repo.get_by_store_and_name(store_id, &name)
                    .await?
                    .ok_or(PosError::Db(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    /// Gets the store's default category ("Standard Rate").
    pub async fn get_default_tax_category(&self, store_id: &str) -> PosResult<TaxCategory> {
        self.categories()
            .get_by_store_and_name(store_id, STANDARD_RATE_NAME)
            .await?
            .ok_or_else(|| CoreError::TaxCategoryNotFound(STANDARD_RATE_NAME.to_string()).into())
    }

    /// Seeds the three standard categories for a store. Idempotent:
    /// categories are matched by name and existing ones are returned
    /// unchanged, so re-running store setup never duplicates them.
    pub async fn create_default_tax_categories(
        &self,
        store_id: &str,
    ) -> PosResult<Vec<TaxCategory>> {
        let repo = self.categories();
        let mut categories = Vec::with_capacity(DEFAULT_TAX_CATEGORIES.len());

        for default in DEFAULT_TAX_CATEGORIES {
            if let Some(existing) = repo.get_by_store_and_name(store_id, default.name).await? {
                categories.push(existing);
                continue;
            }

            let now = Utc::now();
            let category = TaxCategory {
                id: generate_id(),
                store_id: store_id.to_string(),
                name: default.name.to_string(),
                description: Some(default.description.to_string()),
                rate_bps: default.rate.bps(),
                mode: default.mode,
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            match repo.insert(&category).await {
                Ok(()) => categories.push(category),
                Err(err) if err.is_unique_violation() => {
                    let existing = repo
                        .get_by_store_and_name(store_id, default.name)
                        .await?
                        .ok_or(PosError::Db(err))?;
                    categories.push(existing);
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(store_id = %store_id, count = categories.len(), "Default tax categories ensured");
        Ok(categories)
    }

    // =========================================================================
    // Category Management
    // =========================================================================

    /// Creates a named tax category for a store.
    ///
    /// ## Errors
    /// * `DuplicateTaxCategory` - the name is already taken in this store
    /// * `Validation` - empty/overlong name or rate above 100%
    pub async fn create_tax_category(
        &self,
        store_id: &str,
        name: &str,
        description: Option<String>,
        rate: TaxRate,
        mode: TaxMode,
    ) -> PosResult<TaxCategory> {
        validate_category_name(name).map_err(CoreError::from)?;
        validate_rate_bps(rate.bps()).map_err(CoreError::from)?;

        let name = name.trim();
        let repo = self.categories();

        if repo.exists_by_store_and_name(store_id, name).await? {
            return Err(CoreError::DuplicateTaxCategory {
                name: name.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let category = TaxCategory {
            id: generate_id(),
            store_id: store_id.to_string(),
            name: name.to_string(),
            description,
            rate_bps: rate.bps(),
            mode,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        match repo.insert(&category).await {
            Ok(()) => {
                info!(store_id = %store_id, name = %category.name, "Tax category created");
                Ok(category)
            }
            Err(err) if err.is_unique_violation() => Err(CoreError::DuplicateTaxCategory {
                name: name.to_string(),
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Updates name, description, rate and mode of a category. Historical
    /// order breakdowns are untouched; they snapshot name and rate.
    pub async fn update_tax_category(
        &self,
        id: &str,
        name: &str,
        description: Option<String>,
        rate: TaxRate,
        mode: TaxMode,
    ) -> PosResult<TaxCategory> {
        validate_category_name(name).map_err(CoreError::from)?;
        validate_rate_bps(rate.bps()).map_err(CoreError::from)?;

        let name = name.trim();
        let repo = self.categories();

        let mut category = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::TaxCategoryNotFound(id.to_string()))?;

        // A rename must not collide with another category in the store.
        if category.name != name
            && repo
                .exists_by_store_and_name(&category.store_id, name)
                .await?
        {
            return Err(CoreError::DuplicateTaxCategory {
                name: name.to_string(),
            }
            .into());
        }

        category.name = name.to_string();
        category.description = description;
        category.rate_bps = rate.bps();
        category.mode = mode;
        category.updated_at = Utc::now();

        repo.update(&category).await?;

        info!(id = %id, name = %category.name, "Tax category updated");
        Ok(category)
    }

    /// Gets a category by ID.
    pub async fn get_tax_category(&self, id: &str) -> PosResult<TaxCategory> {
        self.categories()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::TaxCategoryNotFound(id.to_string()).into())
    }

    /// Lists all categories for a store (active and inactive).
    pub async fn list_tax_categories(&self, store_id: &str) -> PosResult<Vec<TaxCategory>> {
        Ok(self.categories().list_by_store(store_id).await?)
    }

    /// Lists active categories for a store.
    pub async fn list_active_tax_categories(&self, store_id: &str) -> PosResult<Vec<TaxCategory>> {
        Ok(self.categories().list_active_by_store(store_id).await?)
    }

    /// Activates or deactivates a category.
    pub async fn set_tax_category_active(&self, id: &str, active: bool) -> PosResult<()> {
        match self.categories().set_active(id, active).await {
            Ok(()) => Ok(()),
            Err(crate::error::DbError::NotFound { .. }) => {
                Err(CoreError::TaxCategoryNotFound(id.to_string()).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Hard-deletes a category that was never referenced.
    pub async fn delete_tax_category(&self, id: &str) -> PosResult<()> {
        match self.categories().delete(id).await {
            Ok(()) => {
                info!(id = %id, "Tax category deleted");
                Ok(())
            }
            Err(crate::error::DbError::NotFound { .. }) => {
                Err(CoreError::TaxCategoryNotFound(id.to_string()).into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
