use crate::model::{InflationAdjustment, InflationProjectionPoint, PriceSuggestion};
use crate::utils::round_cents;
use chrono::{Datelike, Months, NaiveDate, Utc};

/// Annual rate applied to any year missing from the benchmark table.
pub const DEFAULT_ANNUAL_RATE: f64 = 0.045;

/// Annual consumer price inflation by calendar year.
const BENCHMARK_RATES: &[(i32, f64)] = &[
    (2019, 0.018),
    (2020, 0.012),
    (2021, 0.047),
    (2022, 0.080),
    (2023, 0.041),
    (2024, 0.029),
    (2025, 0.027),
];

pub fn annual_rate(year: i32) -> f64 {
    BENCHMARK_RATES
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, rate)| *rate)
        .unwrap_or(DEFAULT_ANNUAL_RATE)
}

/// Whole calendar months from `from` to `to`; zero when `to` is not after `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months =
        (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Growth factor minus one after compounding `months` months from `start`.
/// Each month uses one twelfth of the annual rate of the year it falls in.
pub fn cumulative_inflation(start: NaiveDate, months: u32) -> f64 {
    let factor = (0..months).fold(1.0, |factor, i| {
        let month_index = start.month0() + i;
        let year = start.year() + (month_index / 12) as i32;
        factor * (1.0 + annual_rate(year) / 12.0)
    });
    factor - 1.0
}

/// Same as [`calculate_inflation_impact_at`], measured up to today's UTC date.
pub fn calculate_inflation_impact(
    current_price: f64,
    customer_count: u32,
    last_increase_date: NaiveDate,
) -> InflationAdjustment {
    calculate_inflation_impact_at(
        current_price,
        customer_count,
        last_increase_date,
        Utc::now().date_naive(),
    )
}

/// Price that restores purchasing power lost since the last increase, and
/// the annual revenue the whole base would recover by moving to it.
pub fn calculate_inflation_impact_at(
    current_price: f64,
    customer_count: u32,
    last_increase_date: NaiveDate,
    today: NaiveDate,
) -> InflationAdjustment {
    let months = months_between(last_increase_date, today);
    let cumulative = cumulative_inflation(last_increase_date, months);
    let recommended_new_price = current_price * (1.0 + cumulative);

    InflationAdjustment {
        current_price,
        last_price_increase_date: last_increase_date,
        months_since_price_increase: months,
        cumulative_inflation_impact: cumulative,
        recommended_new_price,
        potential_recovery: (recommended_new_price - current_price)
            * f64::from(customer_count)
            * 12.0,
    }
}

/// Month-by-month outlook if the price stays frozen from `start` onwards.
pub fn project_inflation_scenario(
    current_price: f64,
    customer_count: u32,
    start: NaiveDate,
    months_ahead: u32,
) -> Vec<InflationProjectionPoint> {
    (1..=months_ahead)
        .filter_map(|month| {
            let date = start.checked_add_months(Months::new(month))?;
            let cumulative = cumulative_inflation(start, month);
            let projected_price = current_price * (1.0 + cumulative);
            Some(InflationProjectionPoint {
                month,
                date,
                cumulative_inflation: cumulative,
                projected_price,
                revenue_at_risk: (projected_price - current_price)
                    * f64::from(customer_count)
                    * 12.0,
            })
        })
        .collect()
}

pub fn suggest_price_adjustment(
    adjustment: &InflationAdjustment,
    sector: &str,
    region: &str,
) -> PriceSuggestion {
    let adjustment_percentage = (adjustment.cumulative_inflation_impact * 100.0).max(0.0);
    PriceSuggestion {
        suggested_price: round_cents(adjustment.recommended_new_price),
        adjustment_percentage,
        reasoning: format!(
            "Inflation benchmarks for {} ({}) over {} months since the last price increase call for a {:.1}% adjustment.",
            sector, region, adjustment.months_since_price_increase, adjustment_percentage
        ),
    }
}
