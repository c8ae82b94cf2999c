//! # Branch Repository
//!
//! Database operations for branches. A branch belongs to a store and
//! carries the optional default tax percentage used by the fallback path
//! of the tax engine.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::Branch;

/// Repository for branch database operations.
#[derive(Debug, Clone)]
pub struct BranchRepository {
    pool: SqlitePool,
}

impl BranchRepository {
    /// Creates a new BranchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BranchRepository { pool }
    }

    /// Gets a branch by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(
            r#"
            SELECT id, store_id, name, default_tax_bps, created_at
            FROM branches
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Checks whether a branch exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branches WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Inserts a new branch.
    pub async fn insert(&self, branch: &Branch) -> DbResult<()> {
        debug!(id = %branch.id, name = %branch.name, "Inserting branch");

        sqlx::query(
            r#"
            INSERT INTO branches (id, store_id, name, default_tax_bps, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&branch.id)
        .bind(&branch.store_id)
        .bind(&branch.name)
        .bind(branch.default_tax_bps)
        .bind(branch.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the branch default tax rate.
    pub async fn set_default_tax_bps(&self, id: &str, default_tax_bps: Option<u32>) -> DbResult<()> {
        let result = sqlx::query("UPDATE branches SET default_tax_bps = ?2 WHERE id = ?1")
            .bind(id)
            .bind(default_tax_bps)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Branch", id));
        }

        Ok(())
    }
}
