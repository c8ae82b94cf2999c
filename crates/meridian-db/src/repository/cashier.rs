//! # Cashier Repository
//!
//! Database operations for cashiers. Order creation resolves the cashier's
//! assigned branch here; unassigned cashiers cannot sell.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::Cashier;

/// Repository for cashier database operations.
#[derive(Debug, Clone)]
pub struct CashierRepository {
    pool: SqlitePool,
}

impl CashierRepository {
    /// Creates a new CashierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashierRepository { pool }
    }

    /// Gets a cashier by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cashier>> {
        let cashier = sqlx::query_as::<_, Cashier>(
            r#"
            SELECT id, branch_id, full_name, created_at
            FROM cashiers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cashier)
    }

    /// Inserts a new cashier.
    pub async fn insert(&self, cashier: &Cashier) -> DbResult<()> {
        debug!(id = %cashier.id, name = %cashier.full_name, "Inserting cashier");

        sqlx::query(
            r#"
            INSERT INTO cashiers (id, branch_id, full_name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&cashier.id)
        .bind(&cashier.branch_id)
        .bind(&cashier.full_name)
        .bind(cashier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Assigns a cashier to a branch (or unassigns with None).
    pub async fn set_branch(&self, id: &str, branch_id: Option<&str>) -> DbResult<()> {
        let result = sqlx::query("UPDATE cashiers SET branch_id = ?2 WHERE id = ?1")
            .bind(id)
            .bind(branch_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cashier", id));
        }

        Ok(())
    }
}
