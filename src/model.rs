// Core structs: scenarios, billing rows, analysis results
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Inputs for a single price-change projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingScenario {
    pub current_price: f64,
    pub new_price: f64,
    pub current_customers: u32,
    pub customer_acquisition_cost: f64,
    /// Months.
    pub average_contract_length: f64,
    /// Annual churn, percent (0-100).
    pub average_churn: f64,
    /// Overrides the coefficient of the selected elasticity model.
    #[serde(default)]
    pub price_elasticity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueLiftResult {
    pub current_annual_revenue: f64,
    pub new_annual_revenue: f64,
    pub revenue_lift: f64,
    pub revenue_lift_percent: f64,
    pub customer_churn_impact: f64,
    pub net_gain: f64,
    pub break_even_customers: f64,
    pub net_profit_impact: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalPrice {
    pub optimal_price: f64,
    pub max_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandPoint {
    pub price: f64,
    pub demand: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticityAnalysis {
    pub new_price: f64,
    pub new_demand: f64,
    /// Percent.
    pub revenue_change: f64,
    pub elasticity: f64,
}

/// One billing record from an uploaded customer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvRow {
    pub customer_id: String,
    pub customer_name: String,
    pub current_price: f64,
    /// Fraction, not percent.
    pub monthly_churn: f64,
    pub contract_start_date: String,
    pub seats: Option<u32>,
    pub usage: Option<f64>,
    /// Columns that did not map to a known field, keyed by normalized header.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
    /// Line in the source file, header is 0. `None` for rows built in memory.
    #[serde(skip)]
    pub source_row: Option<usize>,
}

impl CsvRow {
    pub fn new(customer_id: &str, customer_name: &str, current_price: f64) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            customer_name: customer_name.to_string(),
            current_price,
            monthly_churn: crate::normalizer::DEFAULT_MONTHLY_CHURN,
            contract_start_date: String::new(),
            seats: None,
            usage: None,
            extra: BTreeMap::new(),
            source_row: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvParseError {
    /// Line number in the source file, header is 0.
    pub row_index: usize,
    pub field: String,
    pub value: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCsvData {
    pub rows: Vec<CsvRow>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub errors: Vec<CsvParseError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Price distribution over a customer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    pub count: usize,
    pub median: f64,
    pub mean: f64,
    /// Population standard deviation. Reported only, no criterion reads it.
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl PriceStats {
    /// Tukey's lower fence, `Q1 - 1.5 * IQR`.
    pub fn lower_fence(&self) -> f64 {
        self.q1 - 1.5 * self.iqr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Which rule flagged an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectionCriterion {
    RelativeDeviation,
    StatisticalOutlier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub row_index: usize,
    pub customer_id: String,
    pub customer_name: String,
    pub current_price: f64,
    pub median_price: f64,
    pub expected_price: f64,
    pub price_deviation: f64,
    pub deviation_percent: f64,
    pub severity: Severity,
    pub criterion: DetectionCriterion,
    pub potential_recovery: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvAnalysisResult {
    pub total_customers: usize,
    #[serde(rename = "totalMRR")]
    pub total_mrr: f64,
    #[serde(rename = "totalARR")]
    pub total_arr: f64,
    pub median_price: f64,
    pub average_price: f64,
    pub anomalies: Vec<AnomalyRecord>,
    pub anomaly_count: usize,
    pub potential_recovery_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationAdjustment {
    pub current_price: f64,
    pub last_price_increase_date: NaiveDate,
    pub months_since_price_increase: u32,
    /// Growth factor minus one.
    pub cumulative_inflation_impact: f64,
    pub recommended_new_price: f64,
    pub potential_recovery: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationProjectionPoint {
    pub month: u32,
    pub date: NaiveDate,
    pub cumulative_inflation: f64,
    pub projected_price: f64,
    /// Annual revenue lost to inflation if the price stays where it is.
    pub revenue_at_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    pub suggested_price: f64,
    pub adjustment_percentage: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRequest {
    /// Local path or `http(s)://` URL.
    pub location: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("price change is undefined for a current price of zero")]
    DivisionUndefined,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("CSV file is empty")]
    EmptyFile,
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response status {0}")]
    InvalidResponse(u16),
    #[error("unsupported file format: {0} (expected .csv)")]
    UnsupportedFormat(String),
    #[error("export is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("export is empty")]
    Empty,
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}
