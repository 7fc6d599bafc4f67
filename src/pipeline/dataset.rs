use std::collections::HashSet;

use csv::ReaderBuilder;

use crate::constants::REQUIRED_COLUMNS;
use crate::error::{PipelineError, Result};

/// One parsed CSV row: the raw cell text of each required column, `None` for
/// blank or whitespace-only cells. Values stay untyped until persistence
/// coerces them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub quantity_sold: Option<String>,
    pub rating: Option<String>,
    pub review_count: Option<String>,
}

/// An uploaded file parsed into rows. Row order is file order; the 1-based
/// source line of row `i` is `i + 2` (header accounted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<RawRow>,
}

/// Fails unless every required column is present in `headers`. Extra columns
/// are ignored; order does not matter.
pub fn validate_columns<'a, I>(headers: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: HashSet<&str> = headers.into_iter().collect();
    if REQUIRED_COLUMNS.iter().any(|col| !present.contains(col)) {
        return Err(PipelineError::Schema);
    }
    Ok(())
}

/// Reads uploaded bytes into a `Dataset`. The header set is validated before
/// any row is materialized, so a schema failure can never touch the store.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(PipelineError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new().from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|_| PipelineError::EmptyFile)?
        .clone();
    validate_columns(headers.iter())?;

    // Column positions are resolved once; validate_columns guarantees each
    // lookup succeeds.
    let position = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let idx_product_id = position("product_id");
    let idx_product_name = position("product_name");
    let idx_category = position("category");
    let idx_price = position("price");
    let idx_quantity_sold = position("quantity_sold");
    let idx_rating = position("rating");
    let idx_review_count = position("review_count");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|_| PipelineError::Malformed)?;
        let cell = |idx: usize| -> Option<String> {
            record
                .get(idx)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        rows.push(RawRow {
            product_id: cell(idx_product_id),
            product_name: cell(idx_product_name),
            category: cell(idx_category),
            price: cell(idx_price),
            quantity_sold: cell(idx_quantity_sold),
            rating: cell(idx_rating),
            review_count: cell(idx_review_count),
        });
    }

    Ok(Dataset { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_fails_schema_check() {
        let csv = b"product_id,product_name,category,price,quantity_sold,rating\n\
                    P1,Widget,Tools,10,5,4.0\n";
        let err = parse_csv(csv).unwrap_err();
        assert!(matches!(err, PipelineError::Schema));
        assert!(err.to_string().contains("review_count"));
    }

    #[test]
    fn empty_input_is_a_distinct_error() {
        assert!(matches!(parse_csv(b"").unwrap_err(), PipelineError::EmptyFile));
        assert!(matches!(
            parse_csv(b"  \n ").unwrap_err(),
            PipelineError::EmptyFile
        ));
    }

    #[test]
    fn ragged_row_is_malformed() {
        let csv = b"product_id,product_name,category,price,quantity_sold,rating,review_count\n\
                    P1,Widget,Tools,10,5,4.0,7\n\
                    P2,Gadget\n";
        assert!(matches!(
            parse_csv(csv).unwrap_err(),
            PipelineError::Malformed
        ));
    }

    #[test]
    fn column_order_is_irrelevant_and_extras_are_ignored() {
        let csv = b"rating,product_name,price,category,quantity_sold,review_count,product_id,note\n\
                    4.5,Widget,10.5,Tools,5,7,P1,ignored\n";
        let dataset = parse_csv(csv).unwrap();
        assert_eq!(dataset.rows.len(), 1);
        let row = &dataset.rows[0];
        assert_eq!(row.product_id.as_deref(), Some("P1"));
        assert_eq!(row.price.as_deref(), Some("10.5"));
        assert_eq!(row.rating.as_deref(), Some("4.5"));
    }

    #[test]
    fn blank_cells_parse_to_none() {
        let csv = b"product_id,product_name,category,price,quantity_sold,rating,review_count\n\
                    P1,Widget,Tools,,5, ,7\n";
        let dataset = parse_csv(csv).unwrap();
        let row = &dataset.rows[0];
        assert_eq!(row.price, None);
        assert_eq!(row.rating, None);
        assert_eq!(row.quantity_sold.as_deref(), Some("5"));
    }
}
