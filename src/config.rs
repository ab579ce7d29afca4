use crate::analyzer::elasticity::{Competitiveness, Industry};
use crate::analyzer::optimizer::PriceRange;
use crate::analyzer::price_analysis::DEFAULT_THRESHOLD;
use crate::model::PricingScenario;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A price change to evaluate for one market segment.
#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub industry: Industry,
    #[serde(default)]
    pub competitiveness: Competitiveness,
    pub scenario: PricingScenario,
    /// Defaults to half to double the current price.
    pub search_range: Option<PriceRange>,
}

/// A customer export to scan for underpriced accounts.
#[derive(Debug, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    /// Local path or `http(s)://` URL.
    pub location: String,
    #[serde(default = "default_threshold")]
    pub deviation_threshold: f64,
    /// Detected from the header line when absent.
    pub delimiter: Option<char>,
}

#[derive(Debug, Deserialize)]
pub struct InflationConfig {
    pub name: String,
    pub current_price: f64,
    pub customer_count: u32,
    pub last_increase_date: NaiveDate,
    #[serde(default)]
    pub projection_months: u32,
    #[serde(default = "default_sector")]
    pub sector: String,
    #[serde(default = "default_region")]
    pub region: String,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    #[serde(default)]
    pub inflation: Vec<InflationConfig>,
    /// Where to write the JSON report; logging only when absent.
    pub report_path: Option<String>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_sector() -> String {
    "IT Services".to_string()
}

fn default_region() -> String {
    "US".to_string()
}

impl AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for dataset in &self.datasets {
            if !(dataset.deviation_threshold > 0.0 && dataset.deviation_threshold < 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "dataset '{}': deviation_threshold must be between 0 and 1",
                    dataset.name
                )));
            }
            if dataset.delimiter.is_some_and(|d| !d.is_ascii()) {
                return Err(ConfigError::Invalid(format!(
                    "dataset '{}': delimiter must be a single ASCII character",
                    dataset.name
                )));
            }
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "scenarios": [{
            "name": "Pro tier +30%",
            "industry": "saas",
            "competitiveness": "high",
            "scenario": {
                "currentPrice": 5000,
                "newPrice": 6500,
                "currentCustomers": 100,
                "customerAcquisitionCost": 2000,
                "averageContractLength": 12,
                "averageChurn": 5
            },
            "search_range": { "min": 4000, "max": 9000 }
        }],
        "datasets": [{ "name": "EU export", "location": "data/eu.csv", "delimiter": ";" }],
        "inflation": [{
            "name": "Legacy plan",
            "current_price": 49.0,
            "customer_count": 320,
            "last_increase_date": "2021-09-01",
            "projection_months": 12
        }],
        "report_path": "report.json"
    }"#;

    #[test]
    fn parses_full_config() {
        let config = parse_config(SAMPLE).unwrap();

        let scenario = &config.scenarios[0];
        assert_eq!(scenario.industry, Industry::Saas);
        assert_eq!(scenario.competitiveness, Competitiveness::High);
        assert_eq!(scenario.scenario.new_price, 6500.0);
        assert_eq!(scenario.scenario.price_elasticity, None);
        assert_eq!(scenario.search_range.map(|r| r.max), Some(9000.0));

        let dataset = &config.datasets[0];
        assert_eq!(dataset.deviation_threshold, DEFAULT_THRESHOLD);
        assert_eq!(dataset.delimiter, Some(';'));

        let inflation = &config.inflation[0];
        assert_eq!(inflation.last_increase_date, NaiveDate::from_ymd_opt(2021, 9, 1).unwrap());
        assert_eq!(inflation.sector, "IT Services");
        assert_eq!(config.report_path.as_deref(), Some("report.json"));
    }

    #[test]
    fn empty_object_is_a_valid_config() {
        let config = parse_config("{}").unwrap();
        assert!(config.scenarios.is_empty());
        assert!(config.report_path.is_none());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = parse_config(
            r#"{"datasets": [{"name": "x", "location": "x.csv", "deviation_threshold": 1.5}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        assert!(matches!(
            load_config("/no/such/config.json"),
            Err(ConfigError::Read(_))
        ));
    }
}
