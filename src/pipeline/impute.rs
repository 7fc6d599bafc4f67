use std::collections::HashMap;

use super::dataset::{Dataset, RawRow};

/// Fills missing numeric values and returns a new `Dataset`, leaving the
/// input behind. Every statistic is computed from the dataset as parsed, so
/// filled values never feed back into later fills.
///
/// - `price`, `quantity_sold`: dataset-wide median of present values.
/// - `rating`: mean of the row's category group, falling back to the overall
///   mean when the group has no present rating. Rows without a category form
///   their own group.
/// - A column with no present parseable value at all keeps its gaps; the
///   persistence step rejects those rows rather than inventing a zero.
pub fn impute(dataset: Dataset) -> Dataset {
    let price_median = median(&present_values(&dataset, |row| row.price.as_deref()));
    let quantity_median = median(&present_values(&dataset, |row| row.quantity_sold.as_deref()));
    let overall_rating_mean = mean(&present_values(&dataset, |row| row.rating.as_deref()));
    let group_rating_means = rating_means_by_category(&dataset);

    let rows = dataset
        .rows
        .into_iter()
        .map(|row| {
            let group = row.category.clone().unwrap_or_default();
            let rating_fill = group_rating_means
                .get(&group)
                .copied()
                .flatten()
                .or(overall_rating_mean);
            RawRow {
                product_id: row.product_id,
                product_name: row.product_name,
                category: row.category,
                price: fill(row.price, price_median),
                quantity_sold: fill(row.quantity_sold, quantity_median),
                rating: fill(row.rating, rating_fill),
                review_count: row.review_count,
            }
        })
        .collect();

    Dataset { rows }
}

fn fill(raw: Option<String>, substitute: Option<f64>) -> Option<String> {
    raw.or_else(|| substitute.map(|value| value.to_string()))
}

fn parse_num(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

fn present_values<F>(dataset: &Dataset, column: F) -> Vec<f64>
where
    F: Fn(&RawRow) -> Option<&str>,
{
    dataset
        .rows
        .iter()
        .filter_map(|row| parse_num(column(row)))
        .collect()
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean rating per category group, `None` when the group has no present
/// rating. Rows with a missing category fall under the empty-string group.
fn rating_means_by_category(dataset: &Dataset) -> HashMap<String, Option<f64>> {
    let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();
    for row in &dataset.rows {
        let group = row.category.clone().unwrap_or_default();
        let values = grouped.entry(group).or_default();
        if let Some(rating) = parse_num(row.rating.as_deref()) {
            values.push(rating);
        }
    }
    grouped
        .into_iter()
        .map(|(group, values)| (group, mean(&values)))
        .collect()
}
