//! # Customer Repository
//!
//! Database operations for customers and their loyalty point balances.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, full_name, loyalty_points, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.full_name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, full_name, loyalty_points, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.full_name)
        .bind(customer.loyalty_points)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds points to a customer's running balance.
    ///
    /// ## Delta Update
    /// `loyalty_points = loyalty_points + delta` in a single statement, so
    /// concurrent accruals never overwrite each other's balance reads.
    pub async fn add_loyalty_points(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting loyalty points");

        let result =
            sqlx::query("UPDATE customers SET loyalty_points = loyalty_points + ?2 WHERE id = ?1")
                .bind(id)
                .bind(delta)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}
