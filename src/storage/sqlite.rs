use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;

use super::ProductStore;
use crate::domain::Product;
use crate::error::{PipelineError, Result};

/// SQLite-backed product store. Batches run inside a single transaction, so a
/// concurrent reader sees either the pre-upload or the fully-applied state.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Private in-memory database, used by tests exercising the SQL paths.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id             INTEGER PRIMARY KEY,
                product_id     TEXT NOT NULL,
                product_name   TEXT NOT NULL,
                category       TEXT NOT NULL,
                price          REAL NOT NULL,
                quantity_sold  INTEGER NOT NULL,
                rating         REAL NOT NULL,
                review_count   INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_products_product_id
                ON products(product_id);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Insert-or-overwrite by natural key; the earliest record wins when
/// duplicate keys exist.
fn upsert_row(tx: &Transaction<'_>, product: &Product) -> rusqlite::Result<()> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM products WHERE product_id = ?1 ORDER BY id LIMIT 1",
            params![product.product_id],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => {
            tx.execute(
                "UPDATE products
                 SET product_name = ?1, category = ?2, price = ?3,
                     quantity_sold = ?4, rating = ?5, review_count = ?6
                 WHERE id = ?7",
                params![
                    product.product_name,
                    product.category,
                    product.price,
                    product.quantity_sold,
                    product.rating,
                    product.review_count,
                    id
                ],
            )?;
        }
        None => {
            tx.execute(
                "INSERT INTO products
                 (product_id, product_name, category, price, quantity_sold, rating, review_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    product.product_id,
                    product.product_name,
                    product.category,
                    product.price,
                    product.quantity_sold,
                    product.rating,
                    product.review_count
                ],
            )?;
        }
    }
    Ok(())
}

#[async_trait]
impl ProductStore for SqliteStore {
    async fn upsert_batch(&self, products: &[Product], replace: bool) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        if replace {
            tx.execute("DELETE FROM products", [])?;
        }
        for (index, product) in products.iter().enumerate() {
            // An early return drops the transaction, rolling back every
            // write above, including the wipe.
            upsert_row(&tx, product).map_err(|e| PipelineError::Ingestion {
                line: index + 2,
                cause: e.to_string(),
            })?;
        }
        tx.commit()?;

        debug!(rows = products.len(), replace, "committed product batch");
        Ok(())
    }

    async fn insert(&self, product: &mut Product) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO products
             (product_id, product_name, category, price, quantity_sold, rating, review_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                product.product_id,
                product.product_name,
                product.category,
                product.price,
                product.quantity_sold,
                product.rating,
                product.review_count
            ],
        )?;
        product.id = Some(conn.last_insert_rowid());
        debug!(product_id = %product.product_id, id = product.id, "created product");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, product_id, product_name, category, price, quantity_sold,
                    rating, review_count
             FROM products ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Product {
                id: Some(row.get(0)?),
                product_id: row.get(1)?,
                product_name: row.get(2)?,
                category: row.get(3)?,
                price: row.get(4)?,
                quantity_sold: row.get(5)?,
                rating: row.get(6)?,
                review_count: row.get(7)?,
            })
        })?;
        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }
}
