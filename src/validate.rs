use crate::constants::NON_NEGATIVE_FIELDS;
use crate::domain::ProductDraft;
use crate::error::{PipelineError, Result};

/// Validates an upload before the pipeline runs: the file must be present,
/// within the size cap, and named `*.csv`.
pub fn check_upload(filename: &str, size: u64, max_bytes: u64) -> Result<()> {
    if size == 0 {
        return Err(PipelineError::InvalidUpload("No file provided".to_string()));
    }
    if size > max_bytes {
        return Err(PipelineError::InvalidUpload(format!(
            "File size cannot be more than {} MB. Size provided is {} MB",
            max_bytes as f64 / 1_000_000.0,
            size as f64 / 1_000_000.0
        )));
    }
    if !filename.ends_with(".csv") {
        return Err(PipelineError::InvalidUpload(
            "Invalid file type. Please upload a CSV file.".to_string(),
        ));
    }
    Ok(())
}

/// Checks a single numeric field, returning the violation when negative.
pub fn check_non_negative(field: &str, value: f64) -> Option<PipelineError> {
    if value < 0.0 {
        Some(PipelineError::NegativeField {
            field: display_name(field),
        })
    } else {
        None
    }
}

/// Runs every per-field check over a draft before a `Product` is constructed.
/// The first violation, in `NON_NEGATIVE_FIELDS` order, is the error.
pub fn validate_product(draft: &ProductDraft) -> Result<()> {
    let values = [
        draft.price,
        draft.quantity_sold as f64,
        draft.rating,
        draft.review_count as f64,
    ];
    let violations: Vec<PipelineError> = NON_NEGATIVE_FIELDS
        .iter()
        .zip(values)
        .filter_map(|(field, value)| check_non_negative(field, value))
        .collect();

    match violations.into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// "review_count" -> "Review count".
fn display_name(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            product_id: "P1".to_string(),
            product_name: "Widget".to_string(),
            category: "Tools".to_string(),
            price: 9.99,
            quantity_sold: 3,
            rating: 4.5,
            review_count: 12,
        }
    }

    #[test]
    fn negative_price_is_rejected_with_field_name() {
        let mut d = draft();
        d.price = -1.0;
        let err = validate_product(&d).unwrap_err();
        assert_eq!(err.to_string(), "Price cannot be negative.");
    }

    #[test]
    fn negative_review_count_uses_spaced_name() {
        let mut d = draft();
        d.review_count = -4;
        let err = validate_product(&d).unwrap_err();
        assert_eq!(err.to_string(), "Review count cannot be negative.");
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate_product(&draft()).is_ok());
    }

    #[test]
    fn upload_prechecks() {
        assert!(check_upload("data.csv", 1024, 5_000_000).is_ok());
        assert!(matches!(
            check_upload("data.csv", 0, 5_000_000).unwrap_err(),
            PipelineError::InvalidUpload(msg) if msg == "No file provided"
        ));
        assert!(matches!(
            check_upload("data.txt", 10, 5_000_000).unwrap_err(),
            PipelineError::InvalidUpload(msg) if msg.contains("CSV file")
        ));
        let err = check_upload("data.csv", 6_000_000, 5_000_000).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File size cannot be more than 5 MB. Size provided is 6 MB"
        );
    }
}
