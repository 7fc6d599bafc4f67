pub mod dataset;
pub mod impute;

use std::sync::Arc;

use tracing::info;

use crate::domain::Product;
use crate::error::{PipelineError, Result};
use crate::report;
use crate::storage::ProductStore;

use self::dataset::{parse_csv, Dataset, RawRow};

/// Use case for ingesting an uploaded product CSV: parse → schema gate →
/// imputation → coercion → atomic upsert. Callers run the upload precheck
/// (`validate::check_upload`) before handing bytes over.
pub struct IngestUseCase {
    store: Arc<dyn ProductStore>,
}

impl IngestUseCase {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Runs the full pipeline over `bytes`. With `append` the rows merge into
    /// the existing records; otherwise the store is replaced wholesale.
    /// Returns the number of rows persisted.
    pub async fn ingest(&self, bytes: &[u8], append: bool) -> Result<usize> {
        let dataset = parse_csv(bytes)?;
        let dataset = impute::impute(dataset);
        let products = coerce_dataset(&dataset)?;
        self.store.upsert_batch(&products, !append).await?;
        info!(rows = products.len(), append, "ingest complete");
        Ok(products.len())
    }
}

/// Use case for the per-category summary report.
pub struct ReportUseCase {
    store: Arc<dyn ProductStore>,
}

impl ReportUseCase {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Aggregates the current store into the summary CSV payload.
    pub async fn summary_csv(&self) -> Result<String> {
        let products = self.store.list().await?;
        let summaries = report::summarize(&products)?;
        report::to_csv(&summaries)
    }
}

/// Coerces every row up front, so a bad row is caught before anything is
/// written and the store trivially keeps its pre-upload state.
fn coerce_dataset(dataset: &Dataset) -> Result<Vec<Product>> {
    dataset
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| coerce_row(row, index))
        .collect()
}

/// `index` is the 0-based data-row position; reported lines add 2 for the
/// header line and 1-based numbering.
fn coerce_row(row: &RawRow, index: usize) -> Result<Product> {
    let line = index + 2;
    let err = |cause: String| PipelineError::Ingestion { line, cause };
    Ok(Product {
        id: None,
        product_id: row.product_id.clone().unwrap_or_default(),
        product_name: row.product_name.clone().unwrap_or_default(),
        category: row.category.clone().unwrap_or_default(),
        price: float_field("price", row.price.as_deref()).map_err(err)?,
        quantity_sold: int_field("quantity_sold", row.quantity_sold.as_deref()).map_err(err)?,
        rating: float_field("rating", row.rating.as_deref()).map_err(err)?,
        review_count: int_field("review_count", row.review_count.as_deref()).map_err(err)?,
    })
}

fn float_field(name: &str, raw: Option<&str>) -> std::result::Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("missing value for '{name}'"))?;
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid numeric value '{raw}' for '{name}'"))
}

/// Integer coercion accepts a fractional fill (an even-count median) and
/// truncates it, matching SQLite's integer affinity.
fn int_field(name: &str, raw: Option<&str>) -> std::result::Result<i64, String> {
    let raw = raw.ok_or_else(|| format!("missing value for '{name}'"))?;
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value as i64)
        .ok_or_else(|| format!("invalid numeric value '{raw}' for '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_reports_the_source_line_of_the_first_bad_row() {
        let dataset = Dataset {
            rows: vec![
                RawRow {
                    product_id: Some("P1".to_string()),
                    product_name: Some("Widget".to_string()),
                    category: Some("Tools".to_string()),
                    price: Some("10".to_string()),
                    quantity_sold: Some("5".to_string()),
                    rating: Some("4.0".to_string()),
                    review_count: Some("7".to_string()),
                },
                RawRow {
                    product_id: Some("P2".to_string()),
                    product_name: Some("Gadget".to_string()),
                    category: Some("Tools".to_string()),
                    price: Some("not-a-price".to_string()),
                    quantity_sold: Some("5".to_string()),
                    rating: Some("4.0".to_string()),
                    review_count: Some("7".to_string()),
                },
            ],
        };
        match coerce_dataset(&dataset).unwrap_err() {
            PipelineError::Ingestion { line, cause } => {
                assert_eq!(line, 3);
                assert!(cause.contains("price"));
            }
            other => panic!("expected ingestion error, got {other}"),
        }
    }

    #[test]
    fn fractional_quantities_truncate_like_integer_affinity() {
        assert_eq!(int_field("quantity_sold", Some("12.5")), Ok(12));
        assert_eq!(int_field("quantity_sold", Some("12")), Ok(12));
        assert!(int_field("quantity_sold", Some("twelve")).is_err());
    }

    #[test]
    fn missing_string_fields_default_to_empty() {
        let row = RawRow {
            product_id: None,
            product_name: None,
            category: None,
            price: Some("1".to_string()),
            quantity_sold: Some("1".to_string()),
            rating: Some("1".to_string()),
            review_count: Some("1".to_string()),
        };
        let product = coerce_row(&row, 0).unwrap();
        assert_eq!(product.product_id, "");
        assert_eq!(product.category, "");
    }
}
