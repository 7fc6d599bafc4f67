/// Columns every uploaded CSV must contain. Order in the file is irrelevant;
/// extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "product_id",
    "product_name",
    "category",
    "price",
    "quantity_sold",
    "rating",
    "review_count",
];

/// Numeric fields checked for negativity when a product is created directly.
pub const NON_NEGATIVE_FIELDS: [&str; 4] = ["price", "quantity_sold", "rating", "review_count"];

/// Default upload size cap (5 MB, decimal) applied before the pipeline runs.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5_000_000;
