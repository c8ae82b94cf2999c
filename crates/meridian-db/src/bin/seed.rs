//! # Seed Data Generator
//!
//! Populates a development database with a small but complete store:
//! a branch, cashiers, customers, the default tax categories, a product
//! catalog with per-branch stock, and one demonstration order created
//! through the full workflow (engine-computed tax included).
//!
//! ## Usage
//! ```bash
//! cargo run -p meridian-db --bin seed
//! cargo run -p meridian-db --bin seed -- --db ./data/meridian.db
//! ```

use chrono::Utc;
use std::env;

use meridian_core::{
    Branch, Cashier, CreateOrderRequest, Customer, Money, OrderLine, PaymentType, Product,
    TaxableLine,
};
use meridian_db::repository::generate_id;
use meridian_db::{Database, DbConfig};

const STORE_ID: &str = "store-demo";

/// (name, sku, price cents, tax exempt, default-category name or None)
const CATALOG: &[(&str, &str, i64, bool, Option<&str>)] = &[
    ("Coca-Cola 330ml", "BEV-001", 250, false, Some("Standard Rate")),
    ("Pepsi 330ml", "BEV-002", 240, false, Some("Standard Rate")),
    ("Mineral Water 1L", "BEV-003", 120, false, Some("Zero Rate")),
    ("Lays Classic", "SNK-001", 180, false, Some("Standard Rate")),
    ("Doritos Nacho", "SNK-002", 220, false, Some("Standard Rate")),
    ("Whole Milk 1L", "DRY-001", 160, false, Some("Reduced Rate")),
    ("White Bread", "GRO-001", 140, false, Some("Reduced Rate")),
    ("Basmati Rice 5kg", "GRO-002", 1250, false, Some("Reduced Rate")),
    ("Paracetamol 500mg", "MED-001", 90, true, None),
    // No category: exercises the branch-default fallback path.
    ("Gift Wrap Roll", "MSC-001", 300, false, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./meridian_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Meridian POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./meridian_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Meridian POS Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.tax_categories().count_by_store(STORE_ID).await?;
    if existing > 0 {
        println!("⚠ Store {} already seeded ({} tax categories)", STORE_ID, existing);
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Tax categories first: products reference them.
    let categories = db.taxes().create_default_tax_categories(STORE_ID).await?;
    println!("✓ {} default tax categories", categories.len());

    let now = Utc::now();

    let branch = Branch {
        id: generate_id(),
        store_id: STORE_ID.to_string(),
        name: "Main Street".to_string(),
        default_tax_bps: Some(1800),
        created_at: now,
    };
    db.branches().insert(&branch).await?;

    let cashier = Cashier {
        id: generate_id(),
        branch_id: Some(branch.id.clone()),
        full_name: "Amir Khan".to_string(),
        created_at: now,
    };
    db.cashiers().insert(&cashier).await?;
    // One unassigned cashier, to exercise the assignment flow.
    db.cashiers()
        .insert(&Cashier {
            id: generate_id(),
            branch_id: None,
            full_name: "Bilal Ahmed".to_string(),
            created_at: now,
        })
        .await?;

    let customer = Customer {
        id: generate_id(),
        full_name: "Sara Ali".to_string(),
        loyalty_points: 0,
        created_at: now,
    };
    db.customers().insert(&customer).await?;
    println!("✓ Branch, cashiers, customer");

    let mut product_ids = Vec::new();
    for (name, sku, price_cents, tax_exempt, category_name) in CATALOG {
        let tax_category_id = category_name.and_then(|wanted| {
            categories
                .iter()
                .find(|c| c.name == *wanted)
                .map(|c| c.id.clone())
        });

        let product = Product {
            id: generate_id(),
            store_id: STORE_ID.to_string(),
            name: name.to_string(),
            sku: Some(sku.to_string()),
            selling_price_cents: *price_cents,
            tax_exempt: *tax_exempt,
            tax_category_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        db.inventory()
            .set_quantity(&branch.id, &product.id, 50)
            .await?;
        product_ids.push(product.id);
    }
    println!("✓ {} products stocked at 50 units each", product_ids.len());

    // One order end-to-end: tax engine first, then the creation workflow
    // with the computed amount and breakdown snapshotted in.
    let lines = vec![
        OrderLine {
            product_id: product_ids[0].clone(),
            quantity: 2,
        },
        OrderLine {
            product_id: product_ids[5].clone(),
            quantity: 1,
        },
    ];
    let taxable: Vec<TaxableLine> = vec![
        TaxableLine {
            product_id: product_ids[0].clone(),
            line_total_cents: 500,
        },
        TaxableLine {
            product_id: product_ids[5].clone(),
            line_total_cents: 160,
        },
    ];

    let tax = db.taxes().calculate_order_tax(&branch.id, &taxable).await?;

    let order = db
        .orders()
        .create_order(CreateOrderRequest {
            cashier_id: cashier.id.clone(),
            customer_id: Some(customer.id.clone()),
            payment_type: PaymentType::Cash,
            items: lines,
            subtotal_cents: None,
            tax_cents: Some(tax.total_tax.cents()),
            discount_cents: None,
            loyalty_points_used: None,
            tax_breakdown: tax.breakdown.iter().map(Into::into).collect(),
        })
        .await?;

    println!(
        "✓ Demo order {}: subtotal {} + tax {} = total {}",
        order.id,
        Money::from_cents(order.subtotal_cents),
        Money::from_cents(order.tax_cents),
        order.total()
    );

    let balance = db
        .customers()
        .get_by_id(&customer.id)
        .await?
        .map(|c| c.loyalty_points)
        .unwrap_or(0);
    println!("✓ Customer {} now has {} loyalty points", customer.full_name, balance);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
