use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::ProductStore;
use crate::domain::Product;
use crate::error::Result;

/// In-memory store for tests and ad-hoc runs. Batch atomicity comes from
/// staging every change on a copy and swapping it in only on success.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    products: Vec<Product>,
    next_id: i64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                products: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn upsert_batch(&self, products: &[Product], replace: bool) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let mut staged = if replace {
            Vec::new()
        } else {
            inner.products.clone()
        };
        let mut next_id = inner.next_id;

        for product in products {
            // First match wins when duplicate natural keys exist.
            match staged
                .iter_mut()
                .find(|existing| existing.product_id == product.product_id)
            {
                Some(existing) => {
                    let id = existing.id;
                    *existing = product.clone();
                    existing.id = id;
                }
                None => {
                    let mut fresh = product.clone();
                    fresh.id = Some(next_id);
                    next_id += 1;
                    staged.push(fresh);
                }
            }
        }

        inner.products = staged;
        inner.next_id = next_id;
        debug!(rows = products.len(), replace, "applied product batch");
        Ok(())
    }

    async fn insert(&self, product: &mut Product) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        product.id = Some(id);
        inner.products.push(product.clone());
        debug!(product_id = %product.product_id, id, "created product");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.products.clone())
    }
}
