// Billing-export CSV parsing
use crate::model::{CsvParseError, CsvRow, ParsedCsvData, ParserError};
use crate::normalizer::{DEFAULT_MONTHLY_CHURN, HeaderField, normalize_all};
use crate::utils::parse_date;
use csv::{Position, ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use tracing::debug;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

pub trait Parser {
    fn parse(&self, content: &str) -> Result<ParsedCsvData, ParserError>;
}

/// Turns CSV text into billing rows. Row-level problems are collected in
/// [`ParsedCsvData::errors`]; only file-level problems fail the parse.
pub struct CsvParser {
    delimiter: Option<u8>,
}

impl CsvParser {
    /// Detects the delimiter from the header line.
    pub fn new() -> Self {
        Self { delimiter: None }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the candidate that occurs most often on the first line, `,` on a tie or no match.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");
    let mut detected = b',';
    let mut max_count = 0;
    for delimiter in CANDIDATE_DELIMITERS {
        let count = first_line.bytes().filter(|b| *b == delimiter).count();
        if count > max_count {
            max_count = count;
            detected = delimiter;
        }
    }
    detected
}

/// Header-relative line of a record: the header is 0, the first data line 1.
fn record_line(position: Option<&Position>, fallback: usize) -> usize {
    position
        .map(|p| (p.line() as usize).saturating_sub(1))
        .unwrap_or(fallback)
}

fn row_error(row_index: usize, field: &str, value: &str, error: String) -> CsvParseError {
    CsvParseError {
        row_index,
        field: field.to_string(),
        value: value.to_string(),
        error,
    }
}

fn map_record(
    fields: &[HeaderField],
    record: &StringRecord,
    row_index: usize,
) -> Result<CsvRow, CsvParseError> {
    let mut customer_id = String::new();
    let mut customer_name = String::new();
    let mut current_price = None;
    let mut monthly_churn = DEFAULT_MONTHLY_CHURN;
    let mut contract_start_date = String::new();
    let mut seats = None;
    let mut usage = None;
    let mut extra = BTreeMap::new();

    for (i, field) in fields.iter().enumerate() {
        let value = record.get(i).unwrap_or("");
        match field {
            HeaderField::CustomerId => customer_id = value.to_string(),
            HeaderField::CustomerName => customer_name = value.to_string(),
            HeaderField::CurrentPrice => {
                let price = value
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite())
                    .ok_or_else(|| {
                        row_error(
                            row_index,
                            "currentPrice",
                            value,
                            format!("invalid price in row {}: \"{}\"", row_index, value),
                        )
                    })?;
                current_price = Some(price);
            }
            HeaderField::MonthlyChurn => {
                monthly_churn = value
                    .parse::<f64>()
                    .map(|pct| pct / 100.0)
                    .unwrap_or(DEFAULT_MONTHLY_CHURN);
            }
            HeaderField::ContractStartDate => {
                contract_start_date = parse_date(value)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| value.to_string());
            }
            HeaderField::Seats => seats = Some(value.parse::<u32>().unwrap_or(1)),
            HeaderField::Usage => usage = Some(value.parse::<f64>().unwrap_or(0.0)),
            HeaderField::Other(key) => {
                extra.insert(key.clone(), value.to_string());
            }
        }
    }

    if customer_id.is_empty() {
        return Err(row_error(
            row_index,
            "customerId",
            "",
            format!("missing customerId in row {}", row_index),
        ));
    }
    let current_price = current_price.ok_or_else(|| {
        row_error(
            row_index,
            "currentPrice",
            "",
            format!("missing currentPrice in row {}", row_index),
        )
    })?;

    Ok(CsvRow {
        customer_id,
        customer_name,
        current_price,
        monthly_churn,
        contract_start_date,
        seats,
        usage,
        extra,
        source_row: Some(row_index),
    })
}

impl Parser for CsvParser {
    fn parse(&self, content: &str) -> Result<ParsedCsvData, ParserError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ParserError::EmptyFile);
        }

        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(content));
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let fields = normalize_all(&headers);

        let mut missing = Vec::new();
        if !fields.contains(&HeaderField::CustomerId) {
            missing.push("customerId".to_string());
        }
        if !fields.contains(&HeaderField::CurrentPrice) {
            missing.push("currentPrice".to_string());
        }
        if !missing.is_empty() {
            return Err(ParserError::MissingColumns(missing));
        }

        let mut parsed = ParsedCsvData::default();
        for (i, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    if record.iter().all(str::is_empty) {
                        continue;
                    }
                    let row_index = record_line(record.position(), i + 1);
                    parsed.total_rows += 1;
                    match map_record(&fields, &record, row_index) {
                        Ok(row) => parsed.rows.push(row),
                        Err(e) => parsed.errors.push(e),
                    }
                }
                Err(e) => {
                    parsed.total_rows += 1;
                    let row_index = record_line(e.position(), i + 1);
                    parsed
                        .errors
                        .push(row_error(row_index, "row", "", e.to_string()));
                }
            }
        }
        parsed.valid_rows = parsed.rows.len();

        debug!(
            "Parsed {} of {} rows ({} errors)",
            parsed.valid_rows,
            parsed.total_rows,
            parsed.errors.len()
        );
        Ok(parsed)
    }
}
