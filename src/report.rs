use std::collections::BTreeMap;

use crate::domain::{CategorySummary, Product};
use crate::error::{PipelineError, Result};

/// Column order of the exported summary.
pub const SUMMARY_HEADER: [&str; 4] = [
    "category",
    "total_revenue",
    "top_product",
    "top_product_quantity_sold",
];

/// Groups records by category: `total_revenue` sums `price` (deliberately
/// price-only, not price x quantity), `top_product` is the name of the first
/// record of the group in the order `products` arrives (surrogate-id order
/// from the store), `top_product_quantity_sold` is the group maximum.
/// Summaries come back in lexicographic category order.
///
/// An empty store is a distinct "nothing to report" condition, not an empty
/// report.
pub fn summarize(products: &[Product]) -> Result<Vec<CategorySummary>> {
    if products.is_empty() {
        return Err(PipelineError::NoData);
    }

    let mut groups: BTreeMap<&str, CategorySummary> = BTreeMap::new();
    for product in products {
        let entry = groups
            .entry(product.category.as_str())
            .or_insert_with(|| CategorySummary {
                category: product.category.clone(),
                total_revenue: 0.0,
                top_product: product.product_name.clone(),
                top_product_quantity_sold: product.quantity_sold,
            });
        entry.total_revenue += product.price;
        entry.top_product_quantity_sold = entry.top_product_quantity_sold.max(product.quantity_sold);
    }

    Ok(groups.into_values().collect())
}

/// Serializes summaries as delimited text: the fixed header row followed by
/// one line per category.
pub fn to_csv(summaries: &[CategorySummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SUMMARY_HEADER)?;
    for summary in summaries {
        let revenue = summary.total_revenue.to_string();
        let quantity = summary.top_product_quantity_sold.to_string();
        writer.write_record([
            summary.category.as_str(),
            revenue.as_str(),
            summary.top_product.as_str(),
            quantity.as_str(),
        ])?;
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| {
        PipelineError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, product_id: &str, name: &str, category: &str, price: f64, quantity: i64) -> Product {
        Product {
            id: Some(id),
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            category: category.to_string(),
            price,
            quantity_sold: quantity,
            rating: 4.0,
            review_count: 10,
        }
    }

    #[test]
    fn empty_store_is_a_no_data_error() {
        assert!(matches!(
            summarize(&[]).unwrap_err(),
            PipelineError::NoData
        ));
    }

    #[test]
    fn groups_sum_revenue_and_take_max_quantity() {
        let products = vec![
            product(1, "P1", "First X", "X", 10.0, 5),
            product(2, "P2", "Second X", "X", 5.0, 20),
            product(3, "P3", "Only Y", "Y", 7.0, 1),
        ];
        let summaries = summarize(&products).unwrap();
        assert_eq!(summaries.len(), 2);

        let x = &summaries[0];
        assert_eq!(x.category, "X");
        assert_eq!(x.total_revenue, 15.0);
        assert_eq!(x.top_product, "First X");
        assert_eq!(x.top_product_quantity_sold, 20);

        let y = &summaries[1];
        assert_eq!(y.category, "Y");
        assert_eq!(y.total_revenue, 7.0);
        assert_eq!(y.top_product, "Only Y");
        assert_eq!(y.top_product_quantity_sold, 1);
    }

    #[test]
    fn categories_emit_in_lexicographic_order() {
        let products = vec![
            product(1, "P1", "B thing", "beta", 1.0, 1),
            product(2, "P2", "A thing", "alpha", 1.0, 1),
        ];
        let summaries = summarize(&products).unwrap();
        assert_eq!(summaries[0].category, "alpha");
        assert_eq!(summaries[1].category, "beta");
    }

    #[test]
    fn csv_payload_has_the_fixed_header() {
        let products = vec![product(1, "P1", "Widget", "Tools", 12.5, 3)];
        let body = to_csv(&summarize(&products).unwrap()).unwrap();
        let mut lines = body.lines();
        assert_eq!(
            lines.next(),
            Some("category,total_revenue,top_product,top_product_quantity_sold")
        );
        assert_eq!(lines.next(), Some("Tools,12.5,Widget,3"));
        assert_eq!(lines.next(), None);
    }
}
