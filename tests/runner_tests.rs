/// Batch runner tests with in-memory and mocked HTTP dataset sources
/// Covers each job kind and the JSON report without touching real exports
use chrono::NaiveDate;
use price_sniper::config::{AppConfig, parse_config};
use price_sniper::model::{DatasetRequest, SourceError};
use price_sniper::runner::{
    process_dataset, process_inflation, process_scenario, run, write_report,
};
use price_sniper::source::{RowSource, SourceImpl};
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves exports from memory, keyed by location.
struct InMemorySource {
    exports: HashMap<String, String>,
}

impl InMemorySource {
    fn new(exports: &[(&str, &str)]) -> Self {
        Self {
            exports: exports
                .iter()
                .map(|(location, body)| (location.to_string(), body.to_string()))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl RowSource for InMemorySource {
    async fn fetch(&self, req: &DatasetRequest) -> Result<String, SourceError> {
        self.exports
            .get(&req.location)
            .cloned()
            .ok_or(SourceError::InvalidResponse(404))
    }
}

const HEALTHY_EXPORT: &str = "id,name,price\n\
    C001,Acme,100\n\
    C002,Globex,100\n\
    C003,Initech,100\n\
    C004,Umbrella,100\n\
    C005,Hooli,40\n";

const BROKEN_EXPORT: &str = "id,price\nC001,100\nC002,0\nC003,abc\n";

fn config() -> AppConfig {
    parse_config(
        r#"{
            "scenarios": [
                {
                    "name": "Pro plan +30%",
                    "industry": "saas",
                    "scenario": {
                        "currentPrice": 5000,
                        "newPrice": 6500,
                        "currentCustomers": 100,
                        "customerAcquisitionCost": 2000,
                        "averageContractLength": 12,
                        "averageChurn": 5
                    }
                },
                {
                    "name": "Free plan",
                    "industry": "agency",
                    "competitiveness": "low",
                    "scenario": {
                        "currentPrice": 0,
                        "newPrice": 10,
                        "currentCustomers": 10,
                        "customerAcquisitionCost": 0,
                        "averageContractLength": 12,
                        "averageChurn": 5
                    }
                }
            ],
            "datasets": [
                { "name": "healthy", "location": "mem://healthy.csv" },
                { "name": "broken", "location": "mem://broken.csv" },
                { "name": "missing", "location": "mem://missing.csv" }
            ],
            "inflation": [{
                "name": "Legacy plan",
                "current_price": 50.0,
                "customer_count": 100,
                "last_increase_date": "2023-01-15",
                "projection_months": 6
            }]
        }"#,
    )
    .unwrap()
}

fn source() -> InMemorySource {
    InMemorySource::new(&[
        ("mem://healthy.csv", HEALTHY_EXPORT),
        ("mem://broken.csv", BROKEN_EXPORT),
    ])
}

#[test]
fn scenario_job_reports_lift_and_optimal_price() {
    let config = config();
    let report = process_scenario(&config.scenarios[0]).unwrap();

    assert_eq!(report.model, "saas_medium");
    assert_eq!(report.elasticity, -1.2);
    assert_eq!(report.revenue_lift.current_annual_revenue, 6_000_000.0);
    assert!(report.revenue_lift.revenue_lift < 0.0);

    let optimal = report.optimal_price.unwrap();
    assert!((2500.0..=10_000.0).contains(&optimal.optimal_price));
    assert!(optimal.max_revenue > 0.0);
}

#[test]
fn scenario_with_zero_price_is_skipped() {
    let config = config();
    assert!(process_scenario(&config.scenarios[1]).is_none());
}

#[tokio::test]
async fn healthy_dataset_is_analyzed() {
    let config = config();
    let report = process_dataset(&config.datasets[0], &source()).await.unwrap();

    assert!(report.validation.is_valid);
    assert!(report.row_errors.is_empty());
    assert_eq!(report.stats.unwrap().median, 100.0);

    let analysis = report.analysis.unwrap();
    assert_eq!(analysis.total_customers, 5);
    assert_eq!(analysis.anomaly_count, 1);
    assert_eq!(analysis.anomalies[0].customer_id, "C005");
    assert_eq!(analysis.potential_recovery_total, 720.0);
}

#[tokio::test]
async fn rejected_dataset_is_still_reported() {
    let config = config();
    let report = process_dataset(&config.datasets[1], &source()).await.unwrap();

    assert!(!report.validation.is_valid);
    assert_eq!(report.row_errors.len(), 1);
    assert_eq!(report.row_errors[0].row_index, 3);
    assert!(report.validation.errors[0].starts_with("Row 2:"));
    assert!(report.stats.is_none());
    assert!(report.analysis.is_none());
}

#[tokio::test]
async fn unreachable_dataset_is_left_out() {
    let config = config();
    assert!(process_dataset(&config.datasets[2], &source()).await.is_none());
}

#[test]
fn inflation_job_projects_requested_months() {
    let config = config();
    let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let report = process_inflation(&config.inflation[0], today);

    assert_eq!(report.adjustment.months_since_price_increase, 24);
    assert!(report.suggestion.suggested_price > 50.0);
    assert_eq!(report.projection.len(), 6);
}

#[tokio::test]
async fn run_writes_camel_case_report() {
    let config = config();
    let report = run(&config, &source()).await;

    assert_eq!(report.scenarios.len(), 1);
    assert_eq!(report.datasets.len(), 2);
    assert_eq!(report.inflation.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    write_report(path.to_str().unwrap(), &report).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(json["generatedAt"].is_string());
    assert_eq!(json["scenarios"][0]["model"], "saas_medium");
    assert_eq!(json["datasets"][0]["name"], "healthy");
    assert_eq!(json["datasets"][1]["validation"]["isValid"], false);
    assert!(json["datasets"][1]["analysis"].is_null());
    assert_eq!(json["inflation"][0]["projection"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn report_to_missing_directory_fails() {
    let report = run(&parse_config("{}").unwrap(), &source()).await;
    assert!(write_report("/definitely/not/here/report.json", &report).is_err());
}

#[tokio::test]
async fn dataset_over_http_is_analyzed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exports/customers.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(HEALTHY_EXPORT, "text/csv"))
        .mount(&server)
        .await;

    let config = parse_config(&format!(
        r#"{{"datasets": [{{"name": "remote", "location": "{}/exports/customers.csv"}}]}}"#,
        server.uri()
    ))
    .unwrap();

    let report = run(&config, &SourceImpl::new().unwrap()).await;
    assert_eq!(report.datasets.len(), 1);
    assert_eq!(report.datasets[0].analysis.as_ref().unwrap().anomaly_count, 1);
}
