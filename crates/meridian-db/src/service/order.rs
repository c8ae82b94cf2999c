//! # Order Service
//!
//! The order creation workflow plus all order queries.
//!
//! ## Creation Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Creation                                     │
//! │                                                                         │
//! │  CreateOrderRequest                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Resolve cashier ──► branch (unassigned cashier = hard error)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                     │
//! │  │  per line:                                                          │
//! │  │    validate quantity                                                │
//! │  │    resolve product                                                  │
//! │  │    UPDATE inventory SET quantity = quantity - q                     │
//! │  │           WHERE ... AND quantity >= q   ← atomic check-and-deduct  │
//! │  │    snapshot line price (unit price × quantity)                      │
//! │  │  totals (caller-supplied or computed)                               │
//! │  │  INSERT order + items + tax breakdown                               │
//! │  COMMIT                                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Loyalty accrual (best-effort, after commit, never fails the order)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure before COMMIT rolls back everything, including stock already
//! deducted for earlier lines. There is no partial order.

use chrono::{Local, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, PosResult};
use crate::repository::branch::BranchRepository;
use crate::repository::cashier::CashierRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::generate_id;
use crate::repository::order::OrderRepository;
use meridian_core::validation::validate_quantity;
use meridian_core::{
    loyalty, CoreError, CreateOrderRequest, Money, Order, OrderFilter, OrderItem, OrderStatus,
    OrderTaxBreakdown, Product,
};

/// Service for the order creation workflow and order queries.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Creates an order: resolves the cashier's branch, deducts stock,
    /// snapshots line prices and persists the aggregate in one transaction.
    ///
    /// ## Totals
    /// `subtotal`, `tax` and `discount` come from the request when present;
    /// a missing subtotal is computed from line snapshots, missing tax and
    /// discount default to zero. `total = subtotal + tax − discount` with no
    /// clamping: an oversized discount produces a negative total, which is
    /// recorded as-is for reconciliation.
    ///
    /// ## Errors
    /// * `CashierNotFound` / `CashierWithoutBranch` - cashier resolution
    /// * `ProductNotFound` - a line references an unknown product
    /// * `InventoryNotFound` - product is not stocked at this branch
    /// * `InsufficientStock` - not enough stock; whole order aborts
    pub async fn create_order(&self, request: CreateOrderRequest) -> PosResult<Order> {
        let cashier = CashierRepository::new(self.pool.clone())
            .get_by_id(&request.cashier_id)
            .await?
            .ok_or_else(|| CoreError::CashierNotFound(request.cashier_id.clone()))?;

        let branch_id = cashier
            .branch_id
            .clone()
            .ok_or_else(|| CoreError::CashierWithoutBranch(cashier.id.clone()))?;

        debug!(
            cashier_id = %cashier.id,
            branch_id = %branch_id,
            lines = request.items.len(),
            "Creating order"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let order_id = generate_id();
        let now = Utc::now();
        let mut items: Vec<OrderItem> = Vec::with_capacity(request.items.len());
        let mut computed_subtotal = Money::zero();

        for line in &request.items {
            validate_quantity(line.quantity).map_err(CoreError::from)?;

            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, store_id, name, sku, selling_price_cents,
                       tax_exempt, tax_category_id, is_active,
                       created_at, updated_at
                FROM products
                WHERE id = ?1
                "#,
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            // Atomic check-and-deduct. The quantity >= ? predicate makes the
            // availability check and the decrement one statement, so two
            // concurrent orders cannot both take the last unit.
            let deducted = sqlx::query(
                r#"
                UPDATE inventory
                SET quantity = quantity - ?3, updated_at = ?4
                WHERE branch_id = ?1 AND product_id = ?2 AND quantity >= ?3
                "#,
            )
            .bind(&branch_id)
            .bind(&product.id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if deducted.rows_affected() == 0 {
                // Zero rows means a missing inventory row or short stock;
                // one read (still inside the transaction) tells them apart.
                let available: Option<i64> = sqlx::query_scalar(
                    "SELECT quantity FROM inventory WHERE branch_id = ?1 AND product_id = ?2",
                )
                .bind(&branch_id)
                .bind(&product.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DbError::from)?;

                // Dropping tx rolls back stock deducted for earlier lines.
                return Err(match available {
                    None => CoreError::InventoryNotFound {
                        product: product.name.clone(),
                        branch: branch_id.clone(),
                    }
                    .into(),
                    Some(available) => CoreError::InsufficientStock {
                        product: product.name.clone(),
                        available,
                        requested: line.quantity,
                    }
                    .into(),
                });
            }

            let line_price = product.selling_price().multiply_quantity(line.quantity);
            computed_subtotal += line_price;

            items.push(OrderItem {
                id: generate_id(),
                order_id: order_id.clone(),
                product_id: product.id,
                quantity: line.quantity,
                price_cents: line_price.cents(),
            });
        }

        let subtotal_cents = request.subtotal_cents.unwrap_or(computed_subtotal.cents());
        let tax_cents = request.tax_cents.unwrap_or(0);
        let discount_cents = request.discount_cents.unwrap_or(0);
        let loyalty_points_used = request.loyalty_points_used.unwrap_or(0);
        let total_cents = subtotal_cents + tax_cents - discount_cents;

        let mut tax_breakdown: Vec<OrderTaxBreakdown> =
            Vec::with_capacity(request.tax_breakdown.len());
        for entry in &request.tax_breakdown {
            tax_breakdown.push(OrderTaxBreakdown {
                id: generate_id(),
                order_id: order_id.clone(),
                tax_category_id: entry.tax_category_id.clone(),
                category_name: entry.category_name.clone(),
                rate_bps: entry.rate_bps,
                taxable_cents: entry.taxable_cents,
                tax_cents: entry.tax_cents,
            });
        }

        let order = Order {
            id: order_id,
            branch_id,
            cashier_id: cashier.id,
            customer_id: request.customer_id,
            subtotal_cents,
            tax_cents,
            discount_cents,
            loyalty_points_used,
            total_cents,
            payment_type: request.payment_type,
            status: OrderStatus::default(),
            created_at: now,
            items,
            tax_breakdown,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, branch_id, cashier_id, customer_id, subtotal_cents,
                tax_cents, discount_cents, loyalty_points_used, total_cents,
                payment_type, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.branch_id)
        .bind(&order.cashier_id)
        .bind(&order.customer_id)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.discount_cents)
        .bind(order.loyalty_points_used)
        .bind(order.total_cents)
        .bind(order.payment_type)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        for entry in &order.tax_breakdown {
            sqlx::query(
                r#"
                INSERT INTO order_tax_breakdown (
                    id, order_id, tax_category_id, category_name,
                    rate_bps, taxable_cents, tax_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&entry.id)
            .bind(&entry.order_id)
            .bind(&entry.tax_category_id)
            .bind(&entry.category_name)
            .bind(entry.rate_bps)
            .bind(entry.taxable_cents)
            .bind(entry.tax_cents)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id = %order.id,
            branch_id = %order.branch_id,
            total_cents = order.total_cents,
            lines = order.items.len(),
            "Order created"
        );

        // The order is committed; loyalty accrual is best-effort from here.
        if let Some(customer_id) = &order.customer_id {
            if let Err(err) = self.accrue_loyalty(customer_id, order.total()).await {
                warn!(
                    order_id = %order.id,
                    customer_id = %customer_id,
                    error = %err,
                    "Loyalty accrual failed; order is unaffected"
                );
            }
        }

        Ok(order)
    }

    /// Credits `floor(total in major units)` points to the customer.
    async fn accrue_loyalty(&self, customer_id: &str, total: Money) -> PosResult<()> {
        let points = loyalty::points_for_total(total);
        if points == 0 {
            return Ok(());
        }

        CustomerRepository::new(self.pool.clone())
            .add_loyalty_points(customer_id, points)
            .await?;

        info!(customer_id = %customer_id, points = points, "Loyalty points accrued");
        Ok(())
    }

    /// Gets a full order aggregate by ID.
    pub async fn get_order_by_id(&self, id: &str) -> PosResult<Order> {
        let order = self
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        Ok(order)
    }

    /// Lists branch orders, newest first, through the optional filters.
    /// Filters are applied after the fetch; all present filters must match.
    pub async fn get_orders_by_branch(
        &self,
        branch_id: &str,
        filter: &OrderFilter,
    ) -> PosResult<Vec<Order>> {
        let mut orders = self.orders().list_by_branch(branch_id).await?;
        orders.retain(|order| filter.matches(order));
        Ok(orders)
    }

    /// Lists orders created by a cashier, newest first.
    pub async fn get_orders_by_cashier(&self, cashier_id: &str) -> PosResult<Vec<Order>> {
        Ok(self.orders().list_by_cashier(cashier_id).await?)
    }

    /// Lists orders placed by a customer, newest first.
    pub async fn get_orders_by_customer(&self, customer_id: &str) -> PosResult<Vec<Order>> {
        Ok(self.orders().list_by_customer(customer_id).await?)
    }

    /// Lists the branch's orders created today, in the server's local
    /// calendar day. An order from 23:59 yesterday does not appear even
    /// though it is less than a minute old.
    pub async fn get_today_orders_by_branch(&self, branch_id: &str) -> PosResult<Vec<Order>> {
        let today = Local::now().date_naive();

        let mut orders = self.orders().list_by_branch(branch_id).await?;
        orders.retain(|order| order.created_at.with_timezone(&Local).date_naive() == today);
        Ok(orders)
    }

    /// Gets the five most recent orders of a branch (fewer if the branch
    /// has fewer). Unlike the plain listing, a missing branch is an error
    /// here rather than an empty result.
    pub async fn get_top5_recent_orders_by_branch(&self, branch_id: &str) -> PosResult<Vec<Order>> {
        if !BranchRepository::new(self.pool.clone())
            .exists(branch_id)
            .await?
        {
            return Err(CoreError::BranchNotFound(branch_id.to_string()).into());
        }

        Ok(self.orders().top5_by_branch(branch_id).await?)
    }

    /// Deletes an order along with its items and tax breakdown.
    /// Stock deducted by the order is NOT restored.
    pub async fn delete_order(&self, id: &str) -> PosResult<()> {
        match self.orders().delete(id).await {
            Ok(()) => {
                info!(order_id = %id, "Order deleted");
                Ok(())
            }
            Err(DbError::NotFound { .. }) => {
                Err(CoreError::OrderNotFound(id.to_string()).into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PosError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::inventory::InventoryRepository;
    use crate::repository::tax_category::TaxCategoryRepository;
    use meridian_core::{
        Branch, Cashier, Customer, OrderLine, PaymentType, TaxBreakdownInput, TaxCategory, TaxMode,
    };
    use std::time::Duration;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_branch(db: &Database, id: &str) -> String {
        db.branches()
            .insert(&Branch {
                id: id.to_string(),
                store_id: "store-1".to_string(),
                name: format!("Branch {id}"),
                default_tax_bps: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        id.to_string()
    }

    async fn seed_cashier(db: &Database, id: &str, branch_id: Option<&str>) -> String {
        db.cashiers()
            .insert(&Cashier {
                id: id.to_string(),
                branch_id: branch_id.map(str::to_string),
                full_name: "Amir Khan".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        id.to_string()
    }

    async fn seed_customer(db: &Database, id: &str) -> String {
        db.customers()
            .insert(&Customer {
                id: id.to_string(),
                full_name: "Sara Ali".to_string(),
                loyalty_points: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        id.to_string()
    }

    async fn seed_product(db: &Database, id: &str, price_cents: i64) -> String {
        db.products()
            .insert(&meridian_core::Product {
                id: id.to_string(),
                store_id: "store-1".to_string(),
                name: format!("Product {id}"),
                sku: None,
                selling_price_cents: price_cents,
                tax_exempt: false,
                tax_category_id: None,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        id.to_string()
    }

    async fn stock(db: &Database, branch_id: &str, product_id: &str, quantity: i64) {
        InventoryRepository::new(db.pool().clone())
            .set_quantity(branch_id, product_id, quantity)
            .await
            .unwrap();
    }

    async fn quantity_of(db: &Database, branch_id: &str, product_id: &str) -> i64 {
        db.inventory()
            .get(branch_id, product_id)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    fn request(cashier_id: &str, items: Vec<OrderLine>) -> CreateOrderRequest {
        CreateOrderRequest {
            cashier_id: cashier_id.to_string(),
            customer_id: None,
            payment_type: PaymentType::Cash,
            items,
            subtotal_cents: None,
            tax_cents: None,
            discount_cents: None,
            loyalty_points_used: None,
            tax_breakdown: Vec::new(),
        }
    }

    fn line(product_id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_create_order_happy_path() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        let chips = seed_product(&db, "p-chips", 180).await;
        stock(&db, &branch, &cola, 10).await;
        stock(&db, &branch, &chips, 4).await;

        let order = db
            .orders()
            .create_order(request(&cashier, vec![line(&cola, 3), line(&chips, 2)]))
            .await
            .unwrap();

        // Subtotal from snapshots: 3×2.50 + 2×1.80 = 11.10
        assert_eq!(order.subtotal_cents, 1110);
        assert_eq!(order.tax_cents, 0);
        assert_eq!(order.total_cents, 1110);
        assert_eq!(order.branch_id, branch);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price_cents, 750);
        assert_eq!(order.items[1].price_cents, 360);

        // Stock was deducted.
        assert_eq!(quantity_of(&db, &branch, &cola).await, 7);
        assert_eq!(quantity_of(&db, &branch, &chips).await, 2);

        // Aggregate round-trips through the repository.
        let loaded = db.orders().get_order_by_id(&order.id).await.unwrap();
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.total_cents, 1110);
    }

    #[tokio::test]
    async fn test_create_order_persists_tax_breakdown() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 10000).await;
        stock(&db, &branch, &cola, 5).await;

        let category = TaxCategory {
            id: "cat-std".to_string(),
            store_id: "store-1".to_string(),
            name: "Standard Rate".to_string(),
            description: None,
            rate_bps: 1800,
            mode: TaxMode::Exclusive,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        TaxCategoryRepository::new(db.pool().clone())
            .insert(&category)
            .await
            .unwrap();

        let mut req = request(&cashier, vec![line(&cola, 1)]);
        req.tax_cents = Some(1800);
        req.tax_breakdown = vec![TaxBreakdownInput {
            tax_category_id: category.id.clone(),
            category_name: category.name.clone(),
            rate_bps: 1800,
            taxable_cents: 10000,
            tax_cents: 1800,
        }];

        let order = db.orders().create_order(req).await.unwrap();
        assert_eq!(order.total_cents, 11800);

        let loaded = db.orders().get_order_by_id(&order.id).await.unwrap();
        assert_eq!(loaded.tax_breakdown.len(), 1);
        assert_eq!(loaded.tax_breakdown[0].category_name, "Standard Rate");
        assert_eq!(loaded.tax_breakdown[0].tax_cents, 1800);
        assert_eq!(loaded.tax_breakdown[0].taxable_cents, 10000);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_earlier_lines() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        let chips = seed_product(&db, "p-chips", 180).await;
        stock(&db, &branch, &cola, 10).await;
        stock(&db, &branch, &chips, 1).await;

        let err = db
            .orders()
            .create_order(request(&cashier, vec![line(&cola, 2), line(&chips, 5)]))
            .await
            .unwrap_err();

        match err {
            PosError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 1);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // The cola deduction from line 1 was rolled back.
        assert_eq!(quantity_of(&db, &branch, &cola).await, 10);
        assert_eq!(quantity_of(&db, &branch, &chips).await, 1);

        // And no order was persisted.
        let orders = db
            .orders()
            .get_orders_by_branch(&branch, &OrderFilter::default())
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_unstocked_product_is_inventory_not_found() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        // No inventory row for cola at this branch.

        let err = db
            .orders()
            .create_order(request(&cashier, vec![line(&cola, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PosError::Core(CoreError::InventoryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_product_and_cashier() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;

        let err = db
            .orders()
            .create_order(request(&cashier, vec![line("p-ghost", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::ProductNotFound(_))));

        let err = db
            .orders()
            .create_order(request("u-ghost", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::CashierNotFound(_))));
    }

    #[tokio::test]
    async fn test_cashier_without_branch_cannot_sell() {
        let db = setup().await;
        seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u-floating", None).await;

        let err = db
            .orders()
            .create_order(request(&cashier, vec![]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PosError::Core(CoreError::CashierWithoutBranch(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        stock(&db, &branch, &cola, 10).await;

        let err = db
            .orders()
            .create_order(request(&cashier, vec![line(&cola, 0)]))
            .await
            .unwrap_err();

        assert!(matches!(err, PosError::Core(CoreError::Validation(_))));
        assert_eq!(quantity_of(&db, &branch, &cola).await, 10);
    }

    #[tokio::test]
    async fn test_oversized_discount_goes_negative() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 500).await;
        stock(&db, &branch, &cola, 10).await;

        let mut req = request(&cashier, vec![line(&cola, 1)]);
        req.discount_cents = Some(800);

        let order = db.orders().create_order(req).await.unwrap();

        // 5.00 − 8.00 = −3.00, recorded without clamping.
        assert_eq!(order.total_cents, -300);
    }

    #[tokio::test]
    async fn test_caller_supplied_totals_are_trusted() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 500).await;
        stock(&db, &branch, &cola, 10).await;

        let mut req = request(&cashier, vec![line(&cola, 2)]);
        req.subtotal_cents = Some(999);
        req.tax_cents = Some(100);
        req.discount_cents = Some(50);

        let order = db.orders().create_order(req).await.unwrap();

        // Used verbatim even though line snapshots sum to 10.00.
        assert_eq!(order.subtotal_cents, 999);
        assert_eq!(order.total_cents, 999 + 100 - 50);
        assert_eq!(order.items[0].price_cents, 1000);
    }

    #[tokio::test]
    async fn test_loyalty_points_accrued_after_order() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let customer = seed_customer(&db, "c1").await;
        let cola = seed_product(&db, "p-cola", 12550).await;
        stock(&db, &branch, &cola, 10).await;

        let mut req = request(&cashier, vec![line(&cola, 2)]);
        req.customer_id = Some(customer.clone());

        let order = db.orders().create_order(req).await.unwrap();
        assert_eq!(order.total_cents, 25100);

        // floor(251.00) = 251 points.
        let balance = db
            .customers()
            .get_by_id(&customer)
            .await
            .unwrap()
            .unwrap()
            .loyalty_points;
        assert_eq!(balance, 251);
    }

    #[tokio::test]
    async fn test_walk_in_order_accrues_nothing() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let customer = seed_customer(&db, "c1").await;
        let cola = seed_product(&db, "p-cola", 5000).await;
        stock(&db, &branch, &cola, 10).await;

        // No customer on the order.
        db.orders()
            .create_order(request(&cashier, vec![line(&cola, 1)]))
            .await
            .unwrap();

        let balance = db
            .customers()
            .get_by_id(&customer)
            .await
            .unwrap()
            .unwrap()
            .loyalty_points;
        assert_eq!(balance, 0);
    }

    #[tokio::test]
    async fn test_orders_listed_newest_first() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        stock(&db, &branch, &cola, 100).await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            let order = db
                .orders()
                .create_order(request(&cashier, vec![line(&cola, 1)]))
                .await
                .unwrap();
            ids.push(order.id);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let listed = db
            .orders()
            .get_orders_by_branch(&branch, &OrderFilter::default())
            .await
            .unwrap();

        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].id, ids[2]);
        assert_eq!(listed[1].id, ids[1]);
        assert_eq!(listed[2].id, ids[0]);
    }

    #[tokio::test]
    async fn test_branch_listing_filters() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let customer = seed_customer(&db, "c1").await;
        let cola = seed_product(&db, "p-cola", 250).await;
        stock(&db, &branch, &cola, 100).await;

        let mut cash = request(&cashier, vec![line(&cola, 1)]);
        cash.customer_id = Some(customer.clone());
        db.orders().create_order(cash).await.unwrap();

        let mut card = request(&cashier, vec![line(&cola, 1)]);
        card.payment_type = PaymentType::Card;
        db.orders().create_order(card).await.unwrap();

        let cash_only = db
            .orders()
            .get_orders_by_branch(
                &branch,
                &OrderFilter {
                    payment_type: Some(PaymentType::Cash),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cash_only.len(), 1);
        assert_eq!(cash_only[0].payment_type, PaymentType::Cash);

        let for_customer = db
            .orders()
            .get_orders_by_branch(
                &branch,
                &OrderFilter {
                    customer_id: Some(customer.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(for_customer.len(), 1);

        // AND semantics: customer + card matches nothing.
        let none = db
            .orders()
            .get_orders_by_branch(
                &branch,
                &OrderFilter {
                    customer_id: Some(customer),
                    payment_type: Some(PaymentType::Card),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_cashier_and_customer_listings() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier_a = seed_cashier(&db, "u-a", Some(&branch)).await;
        let cashier_b = seed_cashier(&db, "u-b", Some(&branch)).await;
        let customer = seed_customer(&db, "c1").await;
        let cola = seed_product(&db, "p-cola", 250).await;
        stock(&db, &branch, &cola, 100).await;

        let mut req = request(&cashier_a, vec![line(&cola, 1)]);
        req.customer_id = Some(customer.clone());
        db.orders().create_order(req).await.unwrap();
        db.orders()
            .create_order(request(&cashier_b, vec![line(&cola, 1)]))
            .await
            .unwrap();

        assert_eq!(db.orders().get_orders_by_cashier(&cashier_a).await.unwrap().len(), 1);
        assert_eq!(db.orders().get_orders_by_cashier(&cashier_b).await.unwrap().len(), 1);
        assert_eq!(db.orders().get_orders_by_customer(&customer).await.unwrap().len(), 1);
        assert!(db.orders().get_orders_by_customer("c-ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top5_caps_and_requires_branch() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        stock(&db, &branch, &cola, 100).await;

        let mut last_id = String::new();
        for _ in 0..6 {
            let order = db
                .orders()
                .create_order(request(&cashier, vec![line(&cola, 1)]))
                .await
                .unwrap();
            last_id = order.id;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let top = db
            .orders()
            .get_top5_recent_orders_by_branch(&branch)
            .await
            .unwrap();
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].id, last_id);

        let err = db
            .orders()
            .get_top5_recent_orders_by_branch("b-ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::BranchNotFound(_))));
    }

    #[tokio::test]
    async fn test_today_filter_excludes_old_orders() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        stock(&db, &branch, &cola, 100).await;

        let today_order = db
            .orders()
            .create_order(request(&cashier, vec![line(&cola, 1)]))
            .await
            .unwrap();

        // Backdate a second order three days, straight into the table.
        let old = Utc::now() - chrono::Duration::days(3);
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, branch_id, cashier_id, customer_id, subtotal_cents,
                tax_cents, discount_cents, loyalty_points_used, total_cents,
                payment_type, status, created_at
            ) VALUES (?1, ?2, ?3, NULL, 250, 0, 0, 0, 250, 'cash', 'completed', ?4)
            "#,
        )
        .bind("o-old")
        .bind(&branch)
        .bind(&cashier)
        .bind(old)
        .execute(db.pool())
        .await
        .unwrap();

        let today = db
            .orders()
            .get_today_orders_by_branch(&branch)
            .await
            .unwrap();

        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, today_order.id);
    }

    #[tokio::test]
    async fn test_delete_order_keeps_stock_deducted() {
        let db = setup().await;
        let branch = seed_branch(&db, "b1").await;
        let cashier = seed_cashier(&db, "u1", Some(&branch)).await;
        let cola = seed_product(&db, "p-cola", 250).await;
        stock(&db, &branch, &cola, 10).await;

        let order = db
            .orders()
            .create_order(request(&cashier, vec![line(&cola, 3)]))
            .await
            .unwrap();
        assert_eq!(quantity_of(&db, &branch, &cola).await, 7);

        db.orders().delete_order(&order.id).await.unwrap();

        // Deletion is not a return: stock stays deducted.
        assert_eq!(quantity_of(&db, &branch, &cola).await, 7);

        let err = db.orders().get_order_by_id(&order.id).await.unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::OrderNotFound(_))));

        let err = db.orders().delete_order(&order.id).await.unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_order_by_id_not_found() {
        let db = setup().await;

        let err = db.orders().get_order_by_id("o-ghost").await.unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::OrderNotFound(_))));
    }
}
