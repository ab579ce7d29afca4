// Batch runner: turns a loaded config into a combined report
use crate::analyzer::elasticity::model_key;
use crate::analyzer::{
    Analyzer, AnalyzerImpl, calculate_inflation_impact_at, calculate_revenue_lift,
    find_optimal_price, project_inflation_scenario, select_model, suggest_price_adjustment,
};
use crate::config::{AppConfig, DatasetConfig, InflationConfig, ScenarioConfig};
use crate::model::{
    CsvAnalysisResult, CsvParseError, DatasetRequest, InflationAdjustment,
    InflationProjectionPoint, OptimalPrice, PriceStats, PriceSuggestion, RevenueLiftResult,
    ValidationResult,
};
use crate::parser::{CsvParser, Parser, validate_csv_data};
use crate::source::RowSource;
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::fs;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("cannot write report: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub model: String,
    pub elasticity: f64,
    pub revenue_lift: RevenueLiftResult,
    pub optimal_price: Option<OptimalPrice>,
}

/// A dataset that failed validation is still reported, without stats or analysis.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReport {
    pub name: String,
    pub row_errors: Vec<CsvParseError>,
    pub validation: ValidationResult,
    pub stats: Option<PriceStats>,
    pub analysis: Option<CsvAnalysisResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationReport {
    pub name: String,
    pub adjustment: InflationAdjustment,
    pub suggestion: PriceSuggestion,
    pub projection: Vec<InflationProjectionPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
    pub datasets: Vec<DatasetReport>,
    pub inflation: Vec<InflationReport>,
}

/// Runs every job in `config`. Datasets are fetched concurrently; failed jobs are logged and left out.
pub async fn run(config: &AppConfig, source: &impl RowSource) -> RunReport {
    info!(
        "Jobs: {} scenarios, {} datasets, {} inflation checks",
        config.scenarios.len(),
        config.datasets.len(),
        config.inflation.len()
    );

    let scenarios: Vec<ScenarioReport> =
        config.scenarios.iter().filter_map(process_scenario).collect();

    let tasks: Vec<_> = config
        .datasets
        .iter()
        .map(|dataset_cfg| process_dataset(dataset_cfg, source))
        .collect();
    let datasets: Vec<DatasetReport> = join_all(tasks).await.into_iter().flatten().collect();

    let generated_at = Utc::now();
    let today = generated_at.date_naive();
    let inflation: Vec<InflationReport> = config
        .inflation
        .iter()
        .map(|cfg| process_inflation(cfg, today))
        .collect();

    RunReport {
        generated_at,
        scenarios,
        datasets,
        inflation,
    }
}

/// Selects the segment's elasticity model, projects the lift and searches for a better price.
pub fn process_scenario(cfg: &ScenarioConfig) -> Option<ScenarioReport> {
    info!("Processing scenario: {}", cfg.name);
    let model = select_model(cfg.industry, cfg.competitiveness);
    let elasticity = cfg.scenario.price_elasticity.unwrap_or(model.price_elasticity);

    let lift = match calculate_revenue_lift(&cfg.scenario, &model) {
        Ok(lift) => lift,
        Err(e) => {
            warn!("Scenario '{}' skipped: {}", cfg.name, e);
            return None;
        }
    };
    info!(
        "Revenue: {:.2} -> {:.2} ({:+.2}%), customers lost: {:.1}, net profit impact: {:.2}",
        lift.current_annual_revenue,
        lift.new_annual_revenue,
        lift.revenue_lift_percent,
        lift.customer_churn_impact,
        lift.net_profit_impact
    );

    let optimal = match find_optimal_price(
        cfg.scenario.current_price,
        cfg.scenario.current_customers,
        elasticity,
        cfg.search_range,
    ) {
        Ok(optimal) => {
            info!(
                "Optimal price: {:.2} (annual revenue {:.2})",
                optimal.optimal_price, optimal.max_revenue
            );
            Some(optimal)
        }
        Err(e) => {
            warn!("Optimal price search failed for '{}': {}", cfg.name, e);
            None
        }
    };

    Some(ScenarioReport {
        name: cfg.name.clone(),
        model: model_key(cfg.industry, cfg.competitiveness),
        elasticity,
        revenue_lift: lift,
        optimal_price: optimal,
    })
}

/// Fetches, parses, validates and analyzes one customer export.
pub async fn process_dataset(
    cfg: &DatasetConfig,
    source: &impl RowSource,
) -> Option<DatasetReport> {
    info!("Processing dataset: {} ({})", cfg.name, cfg.location);
    let request = DatasetRequest {
        location: cfg.location.clone(),
    };

    let content = match source.fetch(&request).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Dataset '{}' fetch error: {}", cfg.name, e);
            return None;
        }
    };

    let parser = match cfg.delimiter.and_then(|d| u8::try_from(d).ok()) {
        Some(delimiter) => CsvParser::with_delimiter(delimiter),
        None => CsvParser::new(),
    };
    let parsed = match parser.parse(&content) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Dataset '{}' parse error: {}", cfg.name, e);
            return None;
        }
    };
    for row_error in &parsed.errors {
        warn!("Row {} skipped: {}", row_error.row_index, row_error.error);
    }

    let validation = validate_csv_data(&parsed.rows);
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid {
        warn!(
            "Dataset '{}' rejected: {}",
            cfg.name,
            validation.errors.join("; ")
        );
        return Some(DatasetReport {
            name: cfg.name.clone(),
            row_errors: parsed.errors,
            validation,
            stats: None,
            analysis: None,
        });
    }

    let analyzer = AnalyzerImpl::with_threshold(cfg.deviation_threshold);
    let stats = analyzer.calculate_stats(&parsed.rows);
    info!(
        "Base stats: median = {:.2}, mean = {:.2}, std_dev = {:.2}, IQR = {:.2}",
        stats.median, stats.mean, stats.std_dev, stats.iqr
    );

    let analysis = analyzer.analyze_with_stats(&parsed.rows, &stats);
    info!(
        "{} customers, MRR {:.2}, {} anomalies, recoverable {:.2}/yr",
        analysis.total_customers,
        analysis.total_mrr,
        analysis.anomaly_count,
        analysis.potential_recovery_total
    );
    for anomaly in analysis.anomalies.iter().take(5) {
        info!(
            "[{}] {} {} pays {:.2} vs median {:.2} (-{:.1}%), recover {:.2}/yr",
            anomaly.severity,
            anomaly.customer_id,
            anomaly.customer_name,
            anomaly.current_price,
            anomaly.median_price,
            anomaly.deviation_percent,
            anomaly.potential_recovery
        );
    }

    Some(DatasetReport {
        name: cfg.name.clone(),
        row_errors: parsed.errors,
        validation,
        stats: Some(stats),
        analysis: Some(analysis),
    })
}

/// Inflation catch-up as of `today`, with a forward projection starting the same day.
pub fn process_inflation(cfg: &InflationConfig, today: NaiveDate) -> InflationReport {
    info!("Processing inflation check: {}", cfg.name);
    let adjustment = calculate_inflation_impact_at(
        cfg.current_price,
        cfg.customer_count,
        cfg.last_increase_date,
        today,
    );
    let suggestion = suggest_price_adjustment(&adjustment, &cfg.sector, &cfg.region);
    info!(
        "{} months since last increase: {:.2} -> {:.2}, recoverable {:.2}/yr",
        adjustment.months_since_price_increase,
        adjustment.current_price,
        suggestion.suggested_price,
        adjustment.potential_recovery
    );
    info!("{}", suggestion.reasoning);

    let projection = project_inflation_scenario(
        cfg.current_price,
        cfg.customer_count,
        today,
        cfg.projection_months,
    );

    InflationReport {
        name: cfg.name.clone(),
        adjustment,
        suggestion,
        projection,
    }
}

/// Writes `report` as pretty-printed JSON.
pub fn write_report(path: &str, report: &RunReport) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!("Saved report: {}", path);
    Ok(())
}
