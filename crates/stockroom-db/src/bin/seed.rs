//! # Seed Data Generator
//!
//! Populates the catalog with branded, categorised products plus a few
//! customers and suppliers for development.
//!
//! ## Usage
//! ```bash
//! # Generate 1,000 products (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockroom-db --bin seed -- --count 5000
//!
//! # Specify database path (overrides STOCKROOM_DATABASE_PATH)
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//!
//! # Read settings from a file first
//! cargo run -p stockroom-db --bin seed -- --config ./stockroom.toml
//! ```
//!
//! Each product gets a `{CATEGORY}-{BRAND}-{INDEX}` product code, a
//! barcode, five prices derived from one base price and a starting stock
//! between 0 and 120.

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use stockroom_core::{Customer, Product, Supplier};
use stockroom_db::{Database, Settings};
use tracing::{info, warn};

/// (category, brands, product lines)
const CATALOG: &[(&str, &[&str], &[&str])] = &[
    (
        "Beverages",
        &["Nestle", "Tapal", "Shezan"],
        &["Mango Juice", "Green Tea", "Mineral Water", "Black Tea", "Lemon Drink"],
    ),
    (
        "Snacks",
        &["Lays", "Kurkure", "Peek Freans"],
        &["Salted Chips", "Masala Chips", "Cream Biscuits", "Nimko Mix", "Choco Cookies"],
    ),
    (
        "Dairy",
        &["Olpers", "Nurpur", "Adams"],
        &["Full Cream Milk", "Butter", "Cheddar Slices", "Plain Yogurt", "Cream"],
    ),
    (
        "Household",
        &["Surf Excel", "Lifebuoy", "Harpic"],
        &["Washing Powder", "Hand Wash", "Toilet Cleaner", "Dish Soap", "Bath Soap"],
    ),
    (
        "Grocery",
        &["Guard", "Shan", "National"],
        &["Basmati Rice", "Biryani Masala", "Chilli Powder", "Cooking Oil", "Iodized Salt"],
    ),
];

/// Pack variants and the price they add, in cents.
const PACKS: &[(&str, i64)] = &[
    ("Small", 0),
    ("250g", 5_000),
    ("500g", 12_000),
    ("1kg", 25_000),
    ("Family Pack", 40_000),
    ("Carton", 150_000),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Walk-in Customer", ""),
    ("Ayesha Khan", "03001234567"),
    ("Bilal Traders", "03217654321"),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Metro Wholesale", "0421112223"),
    ("City Distributors", "03335557777"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 1000;
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of products to generate (default: 1000)");
                println!("  -d, --db <PATH>      Database file path (default: ./stockroom.db)");
                println!("      --config <PATH>  TOML settings file");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut settings = Settings::load(config_path.as_deref())?;
    if let Some(path) = db_path {
        settings.database_path = path;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.env_filter())
        .init();

    info!(
        database = %settings.database_path.display(),
        count,
        "Seeding catalog"
    );

    let db = Database::new(settings.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products; skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let start = Instant::now();
    let mut generated = 0usize;

    'catalog: for (category_idx, (category, brands, lines)) in CATALOG.iter().enumerate() {
        for (brand_idx, brand) in brands.iter().enumerate() {
            for (line_idx, line) in lines.iter().enumerate() {
                for (pack_idx, (pack, addon)) in PACKS.iter().enumerate() {
                    if generated >= count {
                        break 'catalog;
                    }

                    let seed = category_idx * 1000 + brand_idx * 100 + line_idx * 10 + pack_idx;
                    let product = generate_product(category, brand, line, pack, *addon, seed);

                    if let Err(e) = db.products().save(product).await {
                        warn!(error = %e, seed, "Failed to insert product");
                        continue;
                    }

                    generated += 1;
                    if generated % 250 == 0 {
                        info!(generated, "Progress");
                    }
                }
            }
        }
    }

    for (name, contact) in CUSTOMERS {
        db.customers()
            .save(Customer {
                name: name.to_string(),
                contact_number: contact.to_string(),
                ..Default::default()
            })
            .await?;
    }

    for (name, contact) in SUPPLIERS {
        db.suppliers()
            .save(Supplier {
                name: name.to_string(),
                contact_number: contact.to_string(),
                ..Default::default()
            })
            .await?;
    }

    let elapsed = start.elapsed();
    let facets = db.products().brands_and_categories().await?;
    info!(
        generated,
        brands = facets.brands.len(),
        categories = facets.categories.len(),
        customers = CUSTOMERS.len(),
        suppliers = SUPPLIERS.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Builds one catalog entry with deterministic prices and stock.
fn generate_product(
    category: &str,
    brand: &str,
    line: &str,
    pack: &str,
    price_addon: i64,
    seed: usize,
) -> Product {
    let code_prefix = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_uppercase()
    };
    let product_code = format!("{}-{}-{:04}", code_prefix(category), code_prefix(brand), seed);

    // 50.00 to 449.99 base plus the pack addon
    let mrp_cents = 5_000 + ((seed * 37) % 40_000) as i64 + price_addon;
    let cost_pct = 60 + (seed % 20) as i64;
    let cost_price_cents = mrp_cents * cost_pct / 100;

    Product {
        name: format!("{} {} {}", brand, line, pack),
        brand: Some(brand.to_string()),
        category: Some(category.to_string()),
        unit: Some("pcs".to_string()),
        barcode: Some(format!("896{:010}", seed)),
        product_code: Some(product_code),
        quantity: (seed % 121) as i64,
        min_stock_level: 5,
        cost_price_cents,
        purchase_price_cents: cost_price_cents,
        mrp_cents,
        wholesale_price_cents: mrp_cents * 90 / 100,
        dealer_price_cents: mrp_cents * 85 / 100,
        ..Default::default()
    }
}
