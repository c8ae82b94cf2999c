//! # Error Types
//!
//! Domain-specific error types for meridian-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  meridian-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  │     ├── *NotFound            → client-visible 404 equivalent        │
//! │  │     ├── InsufficientStock    → client-visible conflict              │
//! │  │     ├── CashierWithoutBranch → operation error at order creation    │
//! │  │     └── DuplicateTaxCategory → client-visible 400 equivalent        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  meridian-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  No variant is retried anywhere in the core; all failures are          │
//! │  synchronous and immediate.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or missing entities.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced branch does not exist.
    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    /// Referenced cashier does not exist.
    #[error("Cashier not found: {0}")]
    CashierNotFound(String),

    /// Referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Referenced tax category does not exist.
    #[error("Tax category not found: {0}")]
    TaxCategoryNotFound(String),

    /// A product has no inventory record at the branch. Products must be
    /// explicitly stocked per branch before they can be sold there.
    #[error("Inventory not found for product {product} in branch {branch}")]
    InventoryNotFound { product: String, branch: String },

    /// Requested quantity exceeds available inventory. Aborts the whole
    /// order; no partial order with fewer items is created.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The cashier has no assigned branch. An order cannot exist without
    /// a branch.
    #[error("Cashier {0} has no assigned branch")]
    CashierWithoutBranch(String),

    /// Duplicate tax category name within a store on create/rename.
    #[error("Tax category with name '{name}' already exists for this store")]
    DuplicateTaxCategory { name: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Coca-Cola 330ml".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coca-Cola 330ml: available 3, requested 5"
        );

        let err = CoreError::CashierWithoutBranch("u-42".to_string());
        assert_eq!(err.to_string(), "Cashier u-42 has no assigned branch");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
