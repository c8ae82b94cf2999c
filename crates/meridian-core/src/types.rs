//! # Domain Types
//!
//! Core domain types used throughout Meridian POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  selling_price  │   │  subtotal/tax/  │   │  full_name      │       │
//! │  │  tax_exempt     │   │  discount/total │   │  loyalty_points │       │
//! │  │  tax_category   │   │  items[]        │   └─────────────────┘       │
//! │  └─────────────────┘   │  breakdown[]    │                             │
//! │                        └─────────────────┘                             │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Branch      │   │   OrderStatus   │   │  PaymentType    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  store_id       │   │  Pending        │   │  Cash           │       │
//! │  │  default_tax    │   │  Completed      │   │  Card           │       │
//! │  └─────────────────┘   │  Cancelled      │   │  Upi            │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `Order.total_cents = subtotal_cents + tax_cents − discount_cents`,
//!   enforced at creation time, never re-validated on read.
//! - `OrderItem.price_cents` is a snapshot of unit price × quantity taken
//!   at purchase time; later product price changes never touch it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::tax::{TaxRate, DEFAULT_BRANCH_TAX};

// =============================================================================
// Catalog & Org
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this product belongs to.
    pub store_id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Optional Stock Keeping Unit - business identifier.
    pub sku: Option<String>,

    /// Unit selling price in cents.
    pub selling_price_cents: i64,

    /// Explicitly excluded from tax computation regardless of category.
    pub tax_exempt: bool,

    /// Assigned tax category, if any. Products without one fall back to
    /// the branch default rate at calculation time.
    pub tax_category_id: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit selling price as a Money type.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }
}

/// A branch of a store. Every order belongs to exactly one branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: String,

    /// Owning store (external store service reference).
    pub store_id: String,

    pub name: String,

    /// Branch-level default tax rate in bps, applied to products without
    /// an assigned category. None means the 18% system default.
    pub default_tax_bps: Option<u32>,

    pub created_at: DateTime<Utc>,
}

impl Branch {
    /// The effective fallback rate for this branch.
    pub fn default_tax_rate(&self) -> TaxRate {
        self.default_tax_bps
            .map(TaxRate::from_bps)
            .unwrap_or(DEFAULT_BRANCH_TAX)
    }
}

/// A cashier. Orders can only be created by cashiers assigned to a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cashier {
    pub id: String,

    /// Assigned branch; None for cashiers not yet placed.
    pub branch_id: Option<String>,

    pub full_name: String,

    pub created_at: DateTime<Utc>,
}

/// A customer with a running loyalty point balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub full_name: String,
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
}

/// Per-branch, per-product stock level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Stock {
    pub branch_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Status & Payment Type
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order recorded but not yet settled.
    Pending,
    /// Order paid and finalized.
    Completed,
    /// Order cancelled.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Completed
    }
}

/// How the order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Card,
    Upi,
}

// =============================================================================
// Order Aggregate
// =============================================================================

/// A persisted order.
///
/// Owns its line items and tax breakdown rows (cascade lifecycle).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub branch_id: String,
    pub cashier_id: String,
    pub customer_id: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub loyalty_points_used: i64,
    pub total_cents: i64,
    pub payment_type: PaymentType,
    pub status: OrderStatus,
    /// Set at creation, immutable after.
    pub created_at: DateTime<Utc>,

    /// Line items, in caller-supplied order. Loaded with the aggregate,
    /// not part of the orders row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// Per-category tax snapshot, if the caller supplied one.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub tax_breakdown: Vec<OrderTaxBreakdown>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in an order.
///
/// Uses the snapshot pattern: `price_cents` is unit selling price ×
/// quantity frozen at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Line price snapshot (unit price × quantity).
    pub price_cents: i64,
}

impl OrderItem {
    /// Returns the line price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Per-category historical tax snapshot attached to an order.
///
/// Name and rate are copied at order time so a later rename or re-rate of
/// the category never alters historical reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderTaxBreakdown {
    pub id: String,
    pub order_id: String,
    pub tax_category_id: String,
    pub category_name: String,
    pub rate_bps: u32,
    pub taxable_cents: i64,
    pub tax_cents: i64,
}

// =============================================================================
// Workflow Inputs
// =============================================================================

/// One requested line of a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Input to order creation.
///
/// ## Caller-trust fields
/// `subtotal_cents`, `tax_cents` and `discount_cents` are used verbatim
/// when present; the workflow does not cross-validate them against the
/// computed line prices and does not invoke the tax engine on its own.
/// Callers that want engine-computed tax run the engine first and pass
/// the result (amount and breakdown) in here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub cashier_id: String,
    pub customer_id: Option<String>,
    pub payment_type: PaymentType,
    pub items: Vec<OrderLine>,
    pub subtotal_cents: Option<i64>,
    pub tax_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub loyalty_points_used: Option<i64>,
    /// Optional per-category snapshot to persist with the order, normally
    /// taken from a `TaxCalculationResult`.
    #[serde(default)]
    pub tax_breakdown: Vec<TaxBreakdownInput>,
}

/// One tax breakdown row to snapshot onto a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBreakdownInput {
    pub tax_category_id: String,
    pub category_name: String,
    pub rate_bps: u32,
    pub taxable_cents: i64,
    pub tax_cents: i64,
}

impl From<&crate::tax::TaxBreakdownEntry> for TaxBreakdownInput {
    fn from(entry: &crate::tax::TaxBreakdownEntry) -> Self {
        TaxBreakdownInput {
            tax_category_id: entry.category_id.clone(),
            category_name: entry.category_name.clone(),
            rate_bps: entry.rate_bps,
            taxable_cents: entry.taxable_amount.cents(),
            tax_cents: entry.tax_amount.cents(),
        }
    }
}

/// One line of input to the order tax engine: a product reference plus the
/// gross line total (price already includes quantity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxableLine {
    pub product_id: String,
    pub line_total_cents: i64,
}

/// Optional filters for branch order listings. Absent filter = pass-through;
/// all present filters are AND'd.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<String>,
    pub cashier_id: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Checks whether an order passes every present filter.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(customer_id) = &self.customer_id {
            if order.customer_id.as_deref() != Some(customer_id.as_str()) {
                return false;
            }
        }
        if let Some(cashier_id) = &self.cashier_id {
            if order.cashier_id != *cashier_id {
                return false;
            }
        }
        if let Some(payment_type) = self.payment_type {
            if order.payment_type != payment_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
