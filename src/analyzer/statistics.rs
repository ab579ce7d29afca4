use crate::model::PriceStats;

pub struct MarketStatistics;

impl MarketStatistics {
    /// Computes the price distribution in one pass over a sorted copy.
    /// An empty slice yields all-zero statistics.
    pub fn price_stats(prices: &[f64]) -> PriceStats {
        if prices.is_empty() {
            return PriceStats::default();
        }

        let mut sorted = prices.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = Self::mean(&sorted);
        let q1 = Self::quartile(&sorted, 1);
        let q3 = Self::quartile(&sorted, 3);

        PriceStats {
            count: sorted.len(),
            median: Self::median(&sorted),
            mean,
            std_dev: Self::std_dev(&sorted, mean),
            q1,
            q3,
            iqr: q3 - q1,
        }
    }

    /// Middle value, or the average of the two middle values. Expects sorted input.
    pub fn median(sorted: &[f64]) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Population standard deviation.
    pub fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    /// Nearest-rank quartile: element at `floor(k * n / 4)` of the sorted slice.
    pub fn quartile(sorted: &[f64], k: usize) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let index = (k * sorted.len() / 4).min(sorted.len() - 1);
        sorted[index]
    }
}
