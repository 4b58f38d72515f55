//! Seed the database with starter catalog data.
//!
//! Inserts the standard category set and a handful of representative
//! products. Safe to re-run: it refuses to touch a database that already
//! has products.

use sqlx::PgPool;

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Electronic devices, gadgets, and accessories"),
    ("Fashion", "Clothing, shoes, and fashion accessories"),
    ("Home & Garden", "Home improvement and garden supplies"),
    ("Sports", "Sports equipment and athletic wear"),
    ("Books", "Books, e-books, and educational materials"),
    ("Beauty", "Cosmetics, skincare, and beauty products"),
    ("Automotive", "Car parts, accessories, and automotive tools"),
];

/// (name, description, price, original price, sku, category, stock)
const PRODUCTS: &[(&str, &str, &str, &str, &str, &str, i32)] = &[
    (
        "iPhone 15 Pro",
        "Latest iPhone with advanced camera system and A17 Pro chip",
        "999.99",
        "1099.99",
        "IPHONE15PRO-001",
        "Electronics",
        50,
    ),
    (
        "MacBook Air M3",
        "Thin and light laptop with M3 chip and all-day battery life",
        "1299.99",
        "1399.99",
        "MACBOOK-AIR-M3-001",
        "Electronics",
        30,
    ),
    (
        "Sony WH-1000XM5 Headphones",
        "Premium noise-canceling wireless headphones",
        "349.99",
        "399.99",
        "SONY-WH1000XM5-001",
        "Electronics",
        75,
    ),
    (
        "Classic Denim Jacket",
        "Timeless denim jacket in a relaxed fit",
        "59.99",
        "79.99",
        "DENIM-JACKET-001",
        "Fashion",
        120,
    ),
    (
        "Ceramic Plant Pot Set",
        "Set of three glazed ceramic pots with drainage trays",
        "34.99",
        "44.99",
        "PLANT-POT-SET-001",
        "Home & Garden",
        80,
    ),
    (
        "Yoga Mat Pro",
        "Non-slip 6mm yoga mat with carrying strap",
        "29.99",
        "39.99",
        "YOGA-MAT-PRO-001",
        "Sports",
        200,
    ),
];

/// Run the seeding routine.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or a query fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MELULA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("MELULA_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;

    if existing > 0 {
        tracing::info!("Database already has {existing} products, skipping seed");
        return Ok(());
    }

    tracing::info!("Inserting categories...");
    for (name, description) in CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (name, description)
             SELECT $1, $2
             WHERE NOT EXISTS (SELECT 1 FROM categories WHERE name = $1)",
        )
        .bind(name)
        .bind(description)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Inserting products...");
    for (name, description, price, original_price, sku, category, stock) in PRODUCTS {
        sqlx::query(
            "INSERT INTO products
                 (name, description, price, original_price, sku, category_id, stock)
             SELECT $1, $2, $3::numeric, $4::numeric, $5, c.id, $6
             FROM categories c
             WHERE c.name = $7
             ON CONFLICT (sku) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(original_price)
        .bind(sku)
        .bind(stock)
        .bind(category)
        .execute(&pool)
        .await?;
    }

    tracing::info!(
        "Seed complete: {} categories, {} products",
        CATEGORIES.len(),
        PRODUCTS.len()
    );
    Ok(())
}
