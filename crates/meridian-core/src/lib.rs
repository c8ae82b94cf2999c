//! # meridian-core: Pure Business Logic for Meridian POS
//!
//! This crate is the **heart** of Meridian POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Meridian POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 API layer (out of scope)                        │   │
//! │  │    create_order, calculate_order_tax, list endpoints            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ meridian-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │    tax    │  │  loyalty  │  │   │
//! │  │   │  Product  │  │   Money   │  │ TaxCategory│ │  points   │  │   │
//! │  │   │   Order   │  │   cents   │  │ calculate │  │   math    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 meridian-db (Database Layer)                    │   │
//! │  │       SQLite repositories, order + tax services                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Customer, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`tax`] - Tax categories, rates and the pure tax aggregation
//! - [`loyalty`] - Loyalty point accrual math
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64), rates in bps
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use meridian_core::money::Money;
//! use meridian_core::tax::{TaxCategory, TaxMode};
//! use chrono::Utc;
//!
//! let standard = TaxCategory {
//!     id: "cat-1".to_string(),
//!     store_id: "store-1".to_string(),
//!     name: "Standard Rate".to_string(),
//!     description: None,
//!     rate_bps: 1800,
//!     mode: TaxMode::Exclusive,
//!     is_active: true,
//!     created_at: Utc::now(),
//!     updated_at: Utc::now(),
//! };
//!
//! // Tax on 100.00 at 18% exclusive = 18.00
//! let tax = standard.tax_amount(Money::from_cents(10000));
//! assert_eq!(tax.cents(), 1800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod loyalty;
pub mod money;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use meridian_core::Money` instead of
// `use meridian_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use tax::{
    TaxBreakdownEntry, TaxCalculationResult, TaxCategory, TaxMode, TaxRate, DEFAULT_BRANCH_TAX,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Can be made configurable per store in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum tax rate in basis points (100%).
///
/// ## Business Reason
/// Rates above 100% are almost certainly data-entry mistakes.
pub const MAX_TAX_RATE_BPS: i64 = 10000;
