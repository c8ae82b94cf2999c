//! # Order Repository
//!
//! Read and delete operations for persisted orders.
//!
//! Order *creation* is a multi-entity transaction (stock decrements, item
//! snapshots, breakdown rows) and lives in
//! [`OrderService`](crate::service::order::OrderService); this repository
//! covers everything after the order exists.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::{Order, OrderItem, OrderTaxBreakdown};

const ORDER_COLUMNS: &str = "id, branch_id, cashier_id, customer_id, subtotal_cents, tax_cents, \
                             discount_cents, loyalty_points_used, total_cents, payment_type, \
                             status, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets a full order aggregate (items and tax breakdown included).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        order.items = self.get_items(id).await?;
        order.tax_breakdown = self.get_tax_breakdown(id).await?;

        Ok(Some(order))
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, price_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the tax breakdown snapshot for an order.
    pub async fn get_tax_breakdown(&self, order_id: &str) -> DbResult<Vec<OrderTaxBreakdown>> {
        let breakdown = sqlx::query_as::<_, OrderTaxBreakdown>(
            r#"
            SELECT id, order_id, tax_category_id, category_name, rate_bps,
                   taxable_cents, tax_cents
            FROM order_tax_breakdown
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(breakdown)
    }

    /// Lists branch orders, most recent first. Items are not loaded for
    /// listings; use [`OrderRepository::get_by_id`] for the full aggregate.
    pub async fn list_by_branch(&self, branch_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE branch_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists orders created by a cashier, most recent first.
    pub async fn list_by_cashier(&self, cashier_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE cashier_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(cashier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists orders placed by a customer, most recent first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE customer_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists at most the five most recent orders of a branch.
    pub async fn top5_by_branch(&self, branch_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE branch_id = ?1 ORDER BY created_at DESC LIMIT 5"
        ))
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Hard-deletes an order. Items and breakdown rows go with it
    /// (ON DELETE CASCADE). Inventory is NOT restored.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }
}
