use crate::model::{CsvRow, ValidationResult};
use std::collections::HashSet;

/// Fewer rows than this still analyze, but with a warning.
pub const RECOMMENDED_MIN_ROWS: usize = 5;
const SUSPICIOUS_PRICE: f64 = 1_000_000.0;
const SUSPICIOUS_SPREAD: f64 = 100.0;

/// Screens parsed rows before they reach the anomaly detector.
/// Messages use the same row numbers as [`CsvParseError::row_index`](crate::model::CsvParseError):
/// the source line with the header as 0. Rows built in memory are numbered by position from 1.
pub fn validate_csv_data(rows: &[CsvRow]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if rows.is_empty() {
        errors.push("CSV file contains no data".to_string());
        return ValidationResult {
            is_valid: false,
            errors,
            warnings,
        };
    }

    if rows.len() < RECOMMENDED_MIN_ROWS {
        warnings.push(format!(
            "At least {} rows are recommended for a reliable analysis",
            RECOMMENDED_MIN_ROWS
        ));
    }

    let mut seen_ids = HashSet::new();
    for (index, row) in rows.iter().enumerate() {
        let line = row.source_row.unwrap_or(index + 1);
        let id = row.customer_id.trim();
        if id.is_empty() {
            errors.push(format!("Row {}: missing customerId", line));
        } else if !seen_ids.insert(id) {
            errors.push(format!("Row {}: duplicate customerId \"{}\"", line, id));
        }

        let price = row.current_price;
        if !price.is_finite() || price <= 0.0 {
            errors.push(format!(
                "Row {}: invalid price \"{}\" (must be a number greater than 0)",
                line, price
            ));
        } else if price > SUSPICIOUS_PRICE {
            warnings.push(format!("Row {}: unusually high price ({})", line, price));
        }
    }

    let valid_prices: Vec<f64> = rows
        .iter()
        .map(|r| r.current_price)
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    if !valid_prices.is_empty() {
        let max = valid_prices.iter().copied().fold(f64::MIN, f64::max);
        let min = valid_prices.iter().copied().fold(f64::MAX, f64::min);
        if max / min > SUSPICIOUS_SPREAD {
            warnings.push(format!(
                "Very wide price spread ({:.2} - {:.2}). Check currency and billing units.",
                min, max
            ));
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CsvParser, Parser};

    fn rows(prices: &[f64]) -> Vec<CsvRow> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| CsvRow::new(&format!("C{}", i), "", p))
            .collect()
    }

    #[test]
    fn empty_input_is_invalid() {
        let result = validate_csv_data(&[]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn clean_data_passes() {
        let result = validate_csv_data(&rows(&[10.0, 20.0, 30.0, 40.0, 50.0]));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn small_sample_warns() {
        let result = validate_csv_data(&rows(&[10.0, 20.0]));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn non_positive_prices_are_errors() {
        let result = validate_csv_data(&rows(&[10.0, 0.0, -5.0, 20.0, 30.0]));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("Row 2:"));
        assert!(result.errors[1].starts_with("Row 3:"));
    }

    #[test]
    fn blank_and_duplicate_ids_are_errors() {
        let mut data = rows(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        data[1].customer_id = "  ".into();
        data[4].customer_id = "C0".into();
        let result = validate_csv_data(&data);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[1].contains("duplicate"));
    }

    #[test]
    fn extreme_values_warn() {
        let result = validate_csv_data(&rows(&[1.0, 20.0, 30.0, 40.0, 2_000_000.0]));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn row_numbers_follow_source_lines_after_skipped_rows() {
        let parsed = CsvParser::new()
            .parse("id,price\nC1,abc\nC2,0\nC3,5\n")
            .unwrap();
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].row_index, 1);

        let result = validate_csv_data(&parsed.rows);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        // C2 sits on the second data line even though C1 was dropped
        assert!(result.errors[0].starts_with("Row 2: invalid price"));
    }
}
