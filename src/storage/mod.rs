mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::domain::Product;
use crate::error::Result;

/// Repository port for the product record store. The pipeline only ever talks
/// to this trait, so it can run against the in-memory fake in tests and the
/// SQLite backend in production.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts or overwrites `products` by natural key (`product_id`) as one
    /// atomic batch, in slice order. With `replace` the store is wiped first
    /// and the wipe is part of the batch: any failure rolls it back too.
    ///
    /// On failure the error carries the 1-based source line of the offending
    /// row (slice index + 2, accounting for the CSV header).
    async fn upsert_batch(&self, products: &[Product], replace: bool) -> Result<()>;

    /// Inserts a single record, assigning its surrogate id.
    async fn insert(&self, product: &mut Product) -> Result<()>;

    /// Every record, in surrogate-id order.
    async fn list(&self) -> Result<Vec<Product>>;
}
