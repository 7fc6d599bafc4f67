use serde::{Deserialize, Serialize};

/// A persisted product row. `id` is the store-assigned surrogate key and is
/// `None` until the record has been written; `product_id` is the natural key
/// uploads are matched on and is not unique by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub price: f64,
    pub quantity_sold: i64,
    pub rating: f64,
    pub review_count: i64,
}

/// Incoming payload for direct product creation. The surrogate id is always
/// assigned by the store, never by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub price: f64,
    pub quantity_sold: i64,
    pub rating: f64,
    pub review_count: i64,
}

impl ProductDraft {
    pub fn into_product(self) -> Product {
        Product {
            id: None,
            product_id: self.product_id,
            product_name: self.product_name,
            category: self.category,
            price: self.price,
            quantity_sold: self.quantity_sold,
            rating: self.rating,
            review_count: self.review_count,
        }
    }
}

/// One line of the per-category summary report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total_revenue: f64,
    pub top_product: String,
    pub top_product_quantity_sold: i64,
}
