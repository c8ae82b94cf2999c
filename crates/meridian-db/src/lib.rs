//! # meridian-db: Database Layer for Meridian POS
//!
//! SQLite persistence and the order/tax workflows built on top of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Meridian POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 API layer (out of scope)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ meridian-db (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────────────┐    ┌──────────────────────────────┐  │   │
//! │  │   │      service        │    │         repository           │  │   │
//! │  │   │  OrderService       │───►│  products, branches,         │  │   │
//! │  │   │  TaxService         │    │  cashiers, customers,        │  │   │
//! │  │   │  (workflows,        │    │  inventory, tax categories,  │  │   │
//! │  │   │   transactions)     │    │  orders (single-entity CRUD) │  │   │
//! │  │   └─────────────────────┘    └──────────────┬───────────────┘  │   │
//! │  │                                             │                  │   │
//! │  │   ┌─────────────────────┐    ┌──────────────▼───────────────┐  │   │
//! │  │   │   pool, migrations  │───►│       SQLite (WAL mode)      │  │   │
//! │  │   └─────────────────────┘    └──────────────────────────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            meridian-core (pure business logic)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entry Point
//! Everything hangs off [`Database`]:
//!
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("meridian.db")).await?;
//!
//! db.taxes().create_default_tax_categories("store-1").await?;
//! let order = db.orders().create_order(request).await?;
//! ```
//!
//! ## Design Principles
//! 1. Repositories are single-entity; services own multi-entity transactions
//! 2. Workflows that must be atomic run inside one SQLite transaction
//! 3. No business math here - cents and bps arithmetic lives in meridian-core

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

pub use error::{DbError, DbResult, PosError, PosResult};
pub use pool::{Database, DbConfig};
pub use repository::branch::BranchRepository;
pub use repository::cashier::CashierRepository;
pub use repository::customer::CustomerRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::tax_category::TaxCategoryRepository;
pub use service::order::OrderService;
pub use service::tax::TaxService;
