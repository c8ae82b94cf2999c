//! # Tax Module
//!
//! Tax rates, tax categories and the pure part of order tax calculation.
//!
//! ## How Tax Flows Through An Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Tax Calculation                              │
//! │                                                                         │
//! │  Line items (gross totals, exempt items already removed)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Group by effective tax category ← resolved by TaxService              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Per category: tax_amount(gross), base_price(gross)  ← THIS MODULE    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TaxCalculationResult { total_tax, taxable_amount, breakdown }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Inclusive vs Exclusive
//! - **Exclusive**: tax is added on top of the price. `tax = gross × r/100`
//! - **Inclusive**: the price already contains the tax; it is backed out:
//!   `tax = gross − gross / (1 + r/100)`
//!
//! Amounts are integer cents and rates are basis points, so both formulas
//! reduce to one integer division with explicit half-up rounding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (standard GST rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Branch-level fallback rate applied when a branch has no configured
/// default tax percentage: 18%.
pub const DEFAULT_BRANCH_TAX: TaxRate = TaxRate::from_bps(1800);

// =============================================================================
// Tax Mode
// =============================================================================

/// How a tax category applies its rate to a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Tax is included in the displayed price (EU/UK model).
    Inclusive,
    /// Tax is added on top of the displayed price (USA model).
    Exclusive,
}

impl Default for TaxMode {
    fn default() -> Self {
        TaxMode::Exclusive
    }
}

// =============================================================================
// Tax Category
// =============================================================================

/// A store-scoped tax category: a named rate plus an application mode.
///
/// Examples: "Standard Rate" (18%), "Reduced Rate" (5%), "Zero Rate" (0%).
///
/// ## Identity
/// `name` is unique per store (enforced by the storage layer). Fallback
/// categories are auto-generated and named from their rate, e.g. "Tax 18%".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TaxCategory {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this category belongs to (external store service reference).
    pub store_id: String,

    /// Display name, unique within the store.
    pub name: String,

    /// Optional description, e.g. "Standard GST applicable to most goods".
    pub description: Option<String>,

    /// Rate in basis points (1800 = 18%).
    pub rate_bps: u32,

    /// Whether the rate is inclusive or exclusive.
    pub mode: TaxMode,

    /// Soft-delete flag; inactive categories are hidden from pickers but
    /// keep their historical references.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaxCategory {
    /// Returns the rate as a typed value.
    #[inline]
    pub fn rate(&self) -> TaxRate {
        TaxRate::from_bps(self.rate_bps)
    }

    /// Calculates the tax contained in (inclusive) or owed on (exclusive)
    /// a gross amount.
    ///
    /// Zero or negative amounts yield zero tax: there is no negative tax.
    ///
    /// ## Formulas
    /// - Exclusive: `tax = gross × rate/100`
    /// - Inclusive: `tax = gross − gross / (1 + rate/100)`
    ///
    /// In integer cents with bps rates (half-up rounding):
    /// - Exclusive: `(cents × bps + 5000) / 10000`
    /// - Inclusive: `(cents × bps + (10000 + bps)/2) / (10000 + bps)`
    pub fn tax_amount(&self, gross: Money) -> Money {
        if !gross.is_positive() {
            return Money::zero();
        }

        let cents = gross.cents() as i128;
        let bps = self.rate_bps as i128;

        let tax = match self.mode {
            // gross × bps / 10000, rounded half-up
            TaxMode::Exclusive => (cents * bps + 5000) / 10000,
            // gross × bps / (10000 + bps), rounded half-up
            TaxMode::Inclusive => {
                let divisor = 10000 + bps;
                (cents * bps + divisor / 2) / divisor
            }
        };

        Money::from_cents(tax as i64)
    }

    /// Calculates the base (pre-tax) price from a gross amount.
    ///
    /// For exclusive categories the gross already is the base price. For
    /// inclusive categories the base is the gross minus the contained tax,
    /// which keeps `base + tax == gross` exact in integer cents.
    ///
    /// Zero or negative amounts yield zero.
    pub fn base_price(&self, gross: Money) -> Money {
        if !gross.is_positive() {
            return Money::zero();
        }

        match self.mode {
            TaxMode::Exclusive => gross,
            TaxMode::Inclusive => gross - self.tax_amount(gross),
        }
    }
}

/// Generates the name of an auto-created fallback tax category.
///
/// The name is rendered from the integer bps value, never from a float, so
/// the same rate always produces the same name: `"Tax 18%"`, `"Tax 8.25%"`.
/// The (store, name) lookup key therefore cannot split into duplicate
/// categories through formatting differences.
pub fn fallback_category_name(rate: TaxRate) -> String {
    let bps = rate.bps();
    if bps % 100 == 0 {
        format!("Tax {}%", bps / 100)
    } else if bps % 10 == 0 {
        format!("Tax {}.{}%", bps / 100, (bps % 100) / 10)
    } else {
        format!("Tax {}.{:02}%", bps / 100, bps % 100)
    }
}

// =============================================================================
// Default Categories
// =============================================================================

/// Name of the store-wide default category.
pub const STANDARD_RATE_NAME: &str = "Standard Rate";

/// Blueprint for one of the seeded per-store tax categories.
#[derive(Debug, Clone, Copy)]
pub struct DefaultTaxCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub rate: TaxRate,
    pub mode: TaxMode,
}

/// The three categories every store starts with. Seeding is idempotent:
/// categories are matched by name and existing ones are skipped.
pub const DEFAULT_TAX_CATEGORIES: [DefaultTaxCategory; 3] = [
    DefaultTaxCategory {
        name: STANDARD_RATE_NAME,
        description: "Standard GST rate applicable to most goods and services",
        rate: TaxRate::from_bps(1800),
        mode: TaxMode::Exclusive,
    },
    DefaultTaxCategory {
        name: "Reduced Rate",
        description: "Reduced GST rate for essential goods",
        rate: TaxRate::from_bps(500),
        mode: TaxMode::Exclusive,
    },
    DefaultTaxCategory {
        name: "Zero Rate",
        description: "Zero-rated or tax-exempt items",
        rate: TaxRate::from_bps(0),
        mode: TaxMode::Exclusive,
    },
];

// =============================================================================
// Calculation Result
// =============================================================================

/// One per-category line of a tax calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBreakdownEntry {
    pub category_id: String,
    pub category_name: String,
    pub rate_bps: u32,
    /// Base amount the tax was computed on (gross minus contained tax for
    /// inclusive categories).
    pub taxable_amount: Money,
    pub tax_amount: Money,
}

/// Result of an order tax calculation.
///
/// Transient: produced fresh on every call, never persisted or cached.
/// The persisted counterpart is the order's tax breakdown snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub total_tax: Money,
    pub taxable_amount: Money,
    pub breakdown: Vec<TaxBreakdownEntry>,
}

/// Aggregates resolved (category, gross line total) pairs into a tax result.
///
/// Grouping happens before any tax is computed: all lines sharing a
/// category are summed first, then taxed once. This matters for rounding -
/// taxing each line separately and summing can differ by a cent.
///
/// Breakdown entries appear in first-seen category order. Callers must not
/// depend on a particular ordering, only on the set of entries.
pub fn calculate(lines: &[(TaxCategory, Money)]) -> TaxCalculationResult {
    // Accumulate gross amounts per category, preserving first-seen order.
    let mut groups: Vec<(&TaxCategory, Money)> = Vec::new();
    for (category, gross) in lines {
        match groups.iter_mut().find(|(c, _)| c.id == category.id) {
            Some((_, sum)) => *sum += *gross,
            None => groups.push((category, *gross)),
        }
    }

    let mut result = TaxCalculationResult::default();

    for (category, gross) in groups {
        let tax = category.tax_amount(gross);
        let taxable = category.base_price(gross);

        result.total_tax += tax;
        result.taxable_amount += taxable;
        result.breakdown.push(TaxBreakdownEntry {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            rate_bps: category.rate_bps,
            taxable_amount: taxable,
            tax_amount: tax,
        });
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn category(rate_bps: u32, mode: TaxMode) -> TaxCategory {
        TaxCategory {
            id: format!("cat-{}-{:?}", rate_bps, mode),
            store_id: "store-1".to_string(),
            name: fallback_category_name(TaxRate::from_bps(rate_bps)),
            description: None,
            rate_bps,
            mode,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_exclusive_tax() {
        // 100.00 at 18% = 18.00
        let cat = category(1800, TaxMode::Exclusive);
        assert_eq!(cat.tax_amount(Money::from_cents(10000)).cents(), 1800);
        // base price of an exclusive gross is the gross itself
        assert_eq!(cat.base_price(Money::from_cents(10000)).cents(), 10000);
    }

    #[test]
    fn test_exclusive_tax_rounding() {
        // 10.00 at 8.25% = 0.825 → rounds half-up to 0.83
        let cat = category(825, TaxMode::Exclusive);
        assert_eq!(cat.tax_amount(Money::from_cents(1000)).cents(), 83);
    }

    #[test]
    fn test_inclusive_tax_backed_out() {
        // 105.00 gross at 5% inclusive: tax = 105 − 105/1.05 = 5.00
        let cat = category(500, TaxMode::Inclusive);
        assert_eq!(cat.tax_amount(Money::from_cents(10500)).cents(), 500);
        assert_eq!(cat.base_price(Money::from_cents(10500)).cents(), 10000);
    }

    #[test]
    fn test_inclusive_base_plus_tax_is_gross() {
        let cat = category(1800, TaxMode::Inclusive);
        for cents in [1, 99, 117, 10000, 10500, 999_999] {
            let gross = Money::from_cents(cents);
            assert_eq!(cat.base_price(gross) + cat.tax_amount(gross), gross);
        }
    }

    #[test]
    fn test_inclusive_base_price_inverse() {
        // base × (1 + r/100) ≈ gross, within one cent of rounding
        let cat = category(1800, TaxMode::Inclusive);
        let gross = Money::from_cents(11800);
        let base = cat.base_price(gross);
        let reconstructed = (base.cents() as f64) * 1.18;
        assert!((reconstructed - gross.cents() as f64).abs() < 1.0);
    }

    #[test]
    fn test_zero_and_negative_amounts() {
        let cat = category(1800, TaxMode::Exclusive);
        assert!(cat.tax_amount(Money::zero()).is_zero());
        assert!(cat.tax_amount(Money::from_cents(-500)).is_zero());
        assert!(cat.base_price(Money::zero()).is_zero());
        assert!(cat.base_price(Money::from_cents(-500)).is_zero());

        let inc = category(1800, TaxMode::Inclusive);
        assert!(inc.tax_amount(Money::from_cents(-500)).is_zero());
    }

    #[test]
    fn test_zero_rate() {
        let cat = category(0, TaxMode::Exclusive);
        assert!(cat.tax_amount(Money::from_cents(10000)).is_zero());

        let inc = category(0, TaxMode::Inclusive);
        assert!(inc.tax_amount(Money::from_cents(10000)).is_zero());
        assert_eq!(inc.base_price(Money::from_cents(10000)).cents(), 10000);
    }

    #[test]
    fn test_fallback_category_name() {
        assert_eq!(fallback_category_name(TaxRate::from_bps(1800)), "Tax 18%");
        assert_eq!(fallback_category_name(TaxRate::from_bps(500)), "Tax 5%");
        assert_eq!(fallback_category_name(TaxRate::from_bps(825)), "Tax 8.25%");
        assert_eq!(fallback_category_name(TaxRate::from_bps(1250)), "Tax 12.5%");
        assert_eq!(fallback_category_name(TaxRate::from_bps(0)), "Tax 0%");
    }

    #[test]
    fn test_tax_rate_conversions() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
        assert!(TaxRate::zero().is_zero());
    }

    #[test]
    fn test_calculate_groups_by_category() {
        let std = category(1800, TaxMode::Exclusive);
        let red = category(500, TaxMode::Exclusive);

        let lines = vec![
            (std.clone(), Money::from_cents(10000)),
            (red.clone(), Money::from_cents(5000)),
            (std.clone(), Money::from_cents(2500)),
        ];

        let result = calculate(&lines);

        // Two distinct categories → two breakdown entries, not three.
        assert_eq!(result.breakdown.len(), 2);

        let std_entry = &result.breakdown[0];
        assert_eq!(std_entry.category_id, std.id);
        assert_eq!(std_entry.taxable_amount.cents(), 12500);
        assert_eq!(std_entry.tax_amount.cents(), 2250);

        let red_entry = &result.breakdown[1];
        assert_eq!(red_entry.taxable_amount.cents(), 5000);
        assert_eq!(red_entry.tax_amount.cents(), 250);

        assert_eq!(result.total_tax.cents(), 2500);
        assert_eq!(result.taxable_amount.cents(), 17500);
    }

    #[test]
    fn test_calculate_breakdown_sums_to_total() {
        let lines = vec![
            (category(1800, TaxMode::Exclusive), Money::from_cents(3333)),
            (category(500, TaxMode::Inclusive), Money::from_cents(7777)),
            (category(825, TaxMode::Exclusive), Money::from_cents(1299)),
        ];

        let result = calculate(&lines);
        let sum: i64 = result.breakdown.iter().map(|e| e.tax_amount.cents()).sum();
        assert_eq!(sum, result.total_tax.cents());
    }

    #[test]
    fn test_calculate_empty() {
        let result = calculate(&[]);
        assert!(result.total_tax.is_zero());
        assert!(result.taxable_amount.is_zero());
        assert!(result.breakdown.is_empty());
    }
}
