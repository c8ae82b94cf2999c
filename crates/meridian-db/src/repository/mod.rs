//! # Repository Module
//!
//! Repository implementations for database access.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern                                  │
//! │                                                                         │
//! │  Services (order creation, tax engine)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository (this module) ← One per aggregate/entity                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool → SQLite                                                   │
//! │                                                                         │
//! │  Repositories own single-entity lookup/persist operations. Anything    │
//! │  that must mutate several entities atomically lives in a service       │
//! │  that opens its own transaction.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod branch;
pub mod cashier;
pub mod customer;
pub mod inventory;
pub mod order;
pub mod product;
pub mod tax_category;

use uuid::Uuid;

/// Generates a new entity ID (UUID v4 as string).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
