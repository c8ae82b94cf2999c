//! # Loyalty Accrual
//!
//! Converts an order total into loyalty points.
//!
//! ## Accrual Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1 point per whole unit of currency spent, POST-discount.               │
//! │                                                                         │
//! │  Order total: 107.49                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  points_for_total() ← floor to whole units                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  107 points credited to the customer's running balance                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Accrual itself is a best-effort side effect owned by the order service:
//! it runs after the order is persisted and is never allowed to fail the
//! order transaction.

use crate::money::Money;

/// Points earned for an order total: floor of the total's major units.
///
/// Uses euclidean division so the result is a true floor. A negative total
/// (oversized discount) therefore yields negative points; intentionally
/// left as-is because the upstream policy for negative totals is unsettled.
///
/// ## Example
/// ```rust
/// use meridian_core::loyalty::points_for_total;
/// use meridian_core::money::Money;
///
/// assert_eq!(points_for_total(Money::from_cents(10749)), 107);
/// assert_eq!(points_for_total(Money::from_cents(99)), 0);
/// ```
pub fn points_for_total(total: Money) -> i64 {
    total.cents().div_euclid(100)
}
