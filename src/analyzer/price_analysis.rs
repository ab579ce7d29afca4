use crate::analyzer::statistics::MarketStatistics;
use crate::model::{AnomalyRecord, CsvAnalysisResult, CsvRow, DetectionCriterion, PriceStats, Severity};
use crate::utils::safe_ratio;
use tracing::debug;

/// Minimum relative gap below the median that counts as underpriced.
pub const DEFAULT_THRESHOLD: f64 = 0.2;
/// Below this many rows the distribution says nothing useful.
pub const MIN_ROWS_FOR_DETECTION: usize = 3;

const HIGH_SEVERITY_DEVIATION: f64 = 0.4;
const MEDIUM_SEVERITY_DEVIATION: f64 = 0.25;

/// Trait defining the interface for a customer price analyzer.
pub trait Analyzer {
    fn calculate_stats(&self, rows: &[CsvRow]) -> PriceStats;
    fn detect_anomalies(&self, rows: &[CsvRow]) -> Vec<AnomalyRecord>;
    fn analyze(&self, rows: &[CsvRow]) -> CsvAnalysisResult;
}

/// Flags customers priced well below the rest of the base.
pub struct AnalyzerImpl {
    threshold: f64,
}

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(deviation: f64) -> Severity {
    if deviation >= HIGH_SEVERITY_DEVIATION {
        Severity::High
    } else if deviation >= MEDIUM_SEVERITY_DEVIATION {
        Severity::Medium
    } else {
        Severity::Low
    }
}

impl Analyzer for AnalyzerImpl {
    fn calculate_stats(&self, rows: &[CsvRow]) -> PriceStats {
        let prices: Vec<f64> = rows.iter().map(|r| r.current_price).collect();
        MarketStatistics::price_stats(&prices)
    }

    fn detect_anomalies(&self, rows: &[CsvRow]) -> Vec<AnomalyRecord> {
        let stats = self.calculate_stats(rows);
        self.detect_with_stats(rows, &stats)
    }

    fn analyze(&self, rows: &[CsvRow]) -> CsvAnalysisResult {
        let stats = self.calculate_stats(rows);
        self.analyze_with_stats(rows, &stats)
    }
}

impl AnalyzerImpl {
    /// Full analysis over statistics the caller already computed for `rows`.
    pub fn analyze_with_stats(&self, rows: &[CsvRow], stats: &PriceStats) -> CsvAnalysisResult {
        let anomalies = self.detect_with_stats(rows, stats);

        let total_mrr: f64 = rows.iter().map(|r| r.current_price).sum();
        let potential_recovery_total = anomalies.iter().map(|a| a.potential_recovery).sum();

        CsvAnalysisResult {
            total_customers: rows.len(),
            total_mrr,
            total_arr: total_mrr * 12.0,
            median_price: stats.median,
            average_price: safe_ratio(total_mrr, rows.len() as f64),
            anomaly_count: anomalies.len(),
            anomalies,
            potential_recovery_total,
        }
    }

    /// Two rules, evaluated per row against `stats`:
    /// a relative gap of at least `threshold` below the median (graded severity),
    /// or falling under Tukey's lower fence (always high severity).
    /// A row is reported at most once. Results are ordered by recoverable revenue, largest first.
    fn detect_with_stats(&self, rows: &[CsvRow], stats: &PriceStats) -> Vec<AnomalyRecord> {
        if rows.len() < MIN_ROWS_FOR_DETECTION {
            debug!(
                "Skipping anomaly detection: {} rows, need {}",
                rows.len(),
                MIN_ROWS_FOR_DETECTION
            );
            return Vec::new();
        }

        let median = stats.median;
        let fence = stats.lower_fence();

        let mut anomalies: Vec<AnomalyRecord> = rows
            .iter()
            .enumerate()
            .filter_map(|(row_index, row)| {
                let price = row.current_price;
                let deviation = safe_ratio(median - price, median);

                let (criterion, severity) = if price < median && deviation >= self.threshold {
                    (DetectionCriterion::RelativeDeviation, classify(deviation))
                } else if price < fence {
                    (DetectionCriterion::StatisticalOutlier, Severity::High)
                } else {
                    return None;
                };

                Some(AnomalyRecord {
                    row_index,
                    customer_id: row.customer_id.clone(),
                    customer_name: row.customer_name.clone(),
                    current_price: price,
                    median_price: median,
                    expected_price: median,
                    price_deviation: median - price,
                    deviation_percent: deviation * 100.0,
                    severity,
                    criterion,
                    potential_recovery: (median - price) * 12.0,
                })
            })
            .collect();

        anomalies.sort_by(|a, b| b.potential_recovery.total_cmp(&a.potential_recovery));
        anomalies
    }
}

/// Full analysis with the default 20% threshold.
pub fn analyze_csv_data(rows: &[CsvRow]) -> CsvAnalysisResult {
    AnalyzerImpl::new().analyze(rows)
}

pub fn detect_pricing_anomalies(rows: &[CsvRow], threshold: f64) -> Vec<AnomalyRecord> {
    AnalyzerImpl::with_threshold(threshold).detect_anomalies(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(prices: &[f64]) -> Vec<CsvRow> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| CsvRow::new(&format!("C{:03}", i + 1), &format!("Customer {}", i + 1), p))
            .collect()
    }

    #[test]
    fn flags_deep_discount_as_high() {
        let result = analyze_csv_data(&rows(&[100.0, 100.0, 100.0, 40.0]));

        assert_eq!(result.median_price, 100.0);
        assert_eq!(result.anomaly_count, 1);
        let anomaly = &result.anomalies[0];
        assert_eq!(anomaly.row_index, 3);
        assert_eq!(anomaly.customer_id, "C004");
        assert_eq!(anomaly.severity, Severity::High);
        assert_eq!(anomaly.criterion, DetectionCriterion::RelativeDeviation);
        assert!((anomaly.deviation_percent - 60.0).abs() < 1e-9);
        assert_eq!(anomaly.potential_recovery, 720.0);
        assert_eq!(result.potential_recovery_total, 720.0);
    }

    #[test]
    fn grades_severity_by_deviation() {
        let anomalies =
            detect_pricing_anomalies(&rows(&[100.0, 100.0, 100.0, 100.0, 78.0, 70.0]), 0.2);
        assert_eq!(anomalies.len(), 2);
        // sorted by recovery: 70 first
        assert_eq!(anomalies[0].current_price, 70.0);
        assert_eq!(anomalies[0].severity, Severity::Medium);
        assert_eq!(anomalies[1].current_price, 78.0);
        assert_eq!(anomalies[1].severity, Severity::Low);
    }

    #[test]
    fn outlier_below_fence_is_forced_high() {
        let anomalies = detect_pricing_anomalies(
            &rows(&[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 90.0]),
            0.2,
        );
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].criterion, DetectionCriterion::StatisticalOutlier);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert!((anomalies[0].deviation_percent - 10.0).abs() < 1e-9);
        assert_eq!(anomalies[0].potential_recovery, 120.0);
    }

    #[test]
    fn row_matching_both_rules_reported_once() {
        let anomalies = detect_pricing_anomalies(
            &rows(&[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 10.0]),
            0.2,
        );
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].criterion, DetectionCriterion::RelativeDeviation);
    }

    #[test]
    fn too_few_rows_yield_no_anomalies_but_totals() {
        let result = analyze_csv_data(&rows(&[100.0, 10.0]));
        assert!(result.anomalies.is_empty());
        assert_eq!(result.total_customers, 2);
        assert_eq!(result.total_mrr, 110.0);
        assert_eq!(result.total_arr, 1320.0);
        assert_eq!(result.average_price, 55.0);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let result = analyze_csv_data(&[]);
        assert_eq!(result.total_customers, 0);
        assert_eq!(result.total_mrr, 0.0);
        assert_eq!(result.median_price, 0.0);
        assert_eq!(result.average_price, 0.0);
        assert_eq!(result.potential_recovery_total, 0.0);
    }

    #[test]
    fn repeated_analysis_is_identical() {
        let data = rows(&[120.0, 80.0, 100.0, 35.0, 60.0, 99.0]);
        assert_eq!(analyze_csv_data(&data), analyze_csv_data(&data));
    }

    #[test]
    fn custom_threshold_widens_net() {
        // median 95, lower fence 45
        let data = rows(&[80.0, 100.0, 120.0, 90.0]);
        assert!(detect_pricing_anomalies(&data, 0.2).is_empty());
        assert_eq!(detect_pricing_anomalies(&data, 0.05).len(), 2);
    }

    #[test]
    fn analysis_uses_supplied_stats() {
        let data = rows(&[120.0, 80.0, 100.0, 35.0, 60.0, 99.0]);
        let analyzer = AnalyzerImpl::new();
        let stats = analyzer.calculate_stats(&data);
        assert_eq!(analyzer.analyze_with_stats(&data, &stats), analyzer.analyze(&data));

        // only the supplied median decides what is underpriced
        let shifted = PriceStats {
            median: 200.0,
            ..stats
        };
        let result = analyzer.analyze_with_stats(&data, &shifted);
        assert_eq!(result.median_price, 200.0);
        assert_eq!(result.anomaly_count, data.len());
        assert!(result.anomalies.iter().all(|a| a.median_price == 200.0));
    }
}
