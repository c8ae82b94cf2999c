//! # Inventory Repository
//!
//! Per-branch, per-product stock levels.
//!
//! ## Concurrency-Safe Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Decrement Strategy                             │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write (races with concurrent orders)            │
//! │     SELECT quantity ... ; check in Rust ; UPDATE quantity = 7          │
//! │                                                                         │
//! │  ✅ CORRECT: atomic conditional update                                 │
//! │     UPDATE inventory SET quantity = quantity - 3                       │
//! │     WHERE branch_id = ? AND product_id = ? AND quantity >= 3           │
//! │                                                                         │
//! │  Zero rows affected means either the row is missing (product not       │
//! │  stocked at this branch) or stock is short - the caller reads the      │
//! │  row once afterwards to tell the two apart.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement used by order creation lives on [`OrderService`]'s
//! transaction so it rolls back with the rest of the order; this repository
//! serves the standalone lookup/restock paths.
//!
//! [`OrderService`]: crate::service::order::OrderService

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use meridian_core::Stock;

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets the stock row for (branch, product).
    ///
    /// ## Returns
    /// * `Ok(Some(Stock))` - Product is stocked at this branch
    /// * `Ok(None)` - No inventory record (product must be stocked before sale)
    pub async fn get(&self, branch_id: &str, product_id: &str) -> DbResult<Option<Stock>> {
        let stock = sqlx::query_as::<_, Stock>(
            r#"
            SELECT branch_id, product_id, quantity, updated_at
            FROM inventory
            WHERE branch_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(branch_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stock)
    }

    /// Sets the absolute quantity for (branch, product), creating the row
    /// if it does not exist. Used for stocking and restocking.
    pub async fn set_quantity(
        &self,
        branch_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(branch_id = %branch_id, product_id = %product_id, quantity = %quantity, "Setting stock");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO inventory (branch_id, product_id, quantity, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (branch_id, product_id)
            DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at
            "#,
        )
        .bind(branch_id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
