//! # Service Module
//!
//! The two multi-entity workflows of Meridian POS.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Services                                        │
//! │                                                                         │
//! │  OrderService (order.rs)                                               │
//! │  └── create_order: cashier/branch resolution, stock check-and-deduct,  │
//! │      price snapshots, totals, persistence - one transaction - plus     │
//! │      best-effort loyalty accrual. Also all order queries and deletion. │
//! │                                                                         │
//! │  TaxService (tax.rs)                                                   │
//! │  └── order/product tax calculation with per-category grouping and     │
//! │      branch-default fallback categories; tax category management.     │
//! │                                                                         │
//! │  Repositories stay single-entity; anything that must mutate several    │
//! │  entities atomically lives here, wrapped in its own transaction.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod order;
pub mod tax;
