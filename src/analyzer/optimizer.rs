use crate::model::{OptimalPrice, PricingError};
use serde::{Deserialize, Serialize};

/// Number of intervals in the price grid.
pub const GRID_STEPS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Half to double the base price.
    pub fn around(base_price: f64) -> Self {
        Self {
            min: base_price * 0.5,
            max: base_price * 2.0,
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Annual revenue at `price` under a linear demand drop relative to `base_price`.
/// Demand bottoms out at zero customers.
pub fn revenue_at(price: f64, base_price: f64, customers: f64, elasticity: f64) -> f64 {
    let price_change_percent = (price - base_price) / base_price;
    let demand_drop = (price_change_percent * elasticity).abs();
    price * (customers * (1.0 - demand_drop)).max(0.0) * 12.0
}

/// Grid search for the revenue-maximizing price.
///
/// Scans `GRID_STEPS + 1` evenly spaced prices from `range.min` to
/// `range.max` inclusive; the first (lowest) price reaching the maximum wins.
/// `base_price` itself is only evaluated if it happens to lie on the grid.
pub fn find_optimal_price(
    base_price: f64,
    customers: u32,
    elasticity: f64,
    range: Option<PriceRange>,
) -> Result<OptimalPrice, PricingError> {
    if base_price == 0.0 {
        return Err(PricingError::DivisionUndefined);
    }
    if base_price < 0.0 || !base_price.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "base price must be positive, got {base_price}"
        )));
    }
    let range = range.unwrap_or_else(|| PriceRange::around(base_price));
    if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
        return Err(PricingError::InvalidInput(format!(
            "empty price range {}..{}",
            range.min, range.max
        )));
    }

    let customers = f64::from(customers);
    let step = (range.max - range.min) / f64::from(GRID_STEPS);

    let mut best: Option<OptimalPrice> = None;
    for i in 0..=GRID_STEPS {
        let price = if i == GRID_STEPS {
            range.max
        } else {
            range.min + step * f64::from(i)
        };
        let revenue = revenue_at(price, base_price, customers, elasticity);
        if best.is_none_or(|b| revenue > b.max_revenue) {
            best = Some(OptimalPrice {
                optimal_price: price,
                max_revenue: revenue,
            });
        }
    }

    // The loop always runs at least once.
    Ok(best.unwrap_or(OptimalPrice {
        optimal_price: range.min,
        max_revenue: revenue_at(range.min, base_price, customers, elasticity),
    }))
}
