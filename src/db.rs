//! # Catalog Store
//!
//! SQLite-backed product catalog. The table is created on startup and seeded
//! with sample products exactly once, when it is found empty. There are no
//! update or delete paths.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Sqlite};
use tracing::{debug, error, info};

use crate::errors::StoreError;

/// A product row as stored in the catalog
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
}

/// A product that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn new(name: &str, description: &str, price: f64, image_url: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            price,
            image_url: image_url.map(str::to_string),
        }
    }
}

/// The fixed sample set inserted into an empty catalog
pub fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct::new(
            "Laptop ProX",
            "A powerful laptop for work and gaming.",
            1200.00,
            Some("https://upload.wikimedia.org/wikipedia/commons/thumb/b/b3/Laptop_computer_on_table.jpg/640px-Laptop_computer_on_table.jpg"),
        ),
        NewProduct::new(
            "Smartphone Ultra",
            "A flagship smartphone with the best camera.",
            800.00,
            Some("https://upload.wikimedia.org/wikipedia/commons/thumb/c/c2/IPhone_14_Pro_Max_mockup.png/640px-IPhone_14_Pro_Max_mockup.png"),
        ),
    ]
}

/// Handle to the product catalog
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    /// Open the database at `database_url`, creating the file if it is missing
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to catalog database at: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Like [`CatalogStore::connect`], but connections are only opened on first
    /// use, so an unreachable database surfaces as query errors later instead.
    pub fn connect_lazy(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the products table if it does not exist
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        info!("Initializing catalog schema...");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price REAL NOT NULL,
                image_url TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        info!("Catalog schema initialized successfully");
        Ok(())
    }

    /// Insert the sample products if, and only if, the catalog is empty.
    ///
    /// Returns the number of inserted rows (0 when the catalog already had data).
    pub async fn seed_if_empty(&self) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;

        if count > 0 {
            debug!(existing = count, "Catalog already populated, skipping seed");
            tx.commit().await?;
            return Ok(0);
        }

        info!("Adding sample products to the catalog...");
        let samples = sample_products();
        for product in &samples {
            insert_with(&mut *tx, product).await?;
        }
        tx.commit().await?;

        info!(inserted = samples.len(), "Sample products added");
        Ok(samples.len())
    }

    /// Insert a single product and return its id
    pub async fn insert_product(&self, product: &NewProduct) -> Result<i64, StoreError> {
        let id = insert_with(&self.pool, product).await?;
        debug!(product_id = id, name = %product.name, "Product inserted");
        Ok(id)
    }

    /// All products in insertion order
    pub async fn try_list_products(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, image_url FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// All products in insertion order. A store failure is logged and reads as
    /// an empty catalog.
    pub async fn list_products(&self) -> Vec<Product> {
        match self.try_list_products().await {
            Ok(products) => {
                info!(count = products.len(), "Loaded products from catalog");
                products
            }
            Err(e) => {
                error!(error = %e, "Failed to load products from catalog");
                Vec::new()
            }
        }
    }

    /// Close every pooled connection. Later reads fail with `StoreError::Unavailable`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn insert_with<'e, E>(executor: E, product: &NewProduct) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO products (name, description, price, image_url) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image_url)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_products_are_complete() {
        let samples = sample_products();
        assert_eq!(samples.len(), 2);
        for product in &samples {
            assert!(!product.name.is_empty());
            assert!(!product.description.is_empty());
            assert!(product.price > 0.0);
            assert!(product.image_url.is_some());
        }
    }

    #[tokio::test]
    async fn test_in_memory_catalog_roundtrip() {
        // A single connection keeps the in-memory database alive and shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = CatalogStore::from_pool(pool);
        store.init_schema().await.unwrap();

        assert!(store.list_products().await.is_empty());
        assert_eq!(store.seed_if_empty().await.unwrap(), 2);
        assert_eq!(store.list_products().await.len(), 2);
    }
}
