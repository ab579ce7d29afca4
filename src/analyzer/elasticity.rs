use crate::model::{DemandPoint, ElasticityAnalysis, OptimalPrice, PricingError};
use crate::utils::{round_cents, safe_ratio};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    Saas,
    Agency,
    Infrastructure,
}

impl Industry {
    pub const ALL: [Industry; 3] = [Industry::Saas, Industry::Agency, Industry::Infrastructure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Saas => "saas",
            Industry::Agency => "agency",
            Industry::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "saas" => Ok(Industry::Saas),
            "agency" => Ok(Industry::Agency),
            "infrastructure" => Ok(Industry::Infrastructure),
            other => Err(PricingError::InvalidInput(format!("unknown industry '{other}'"))),
        }
    }
}

/// How crowded the market is; more competitors means more price-sensitive buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competitiveness {
    Low,
    #[default]
    Medium,
    High,
}

impl Competitiveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Competitiveness::Low => "low",
            Competitiveness::Medium => "medium",
            Competitiveness::High => "high",
        }
    }
}

impl fmt::Display for Competitiveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Competitiveness {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Competitiveness::Low),
            "medium" => Ok(Competitiveness::Medium),
            "high" => Ok(Competitiveness::High),
            other => Err(PricingError::InvalidInput(format!(
                "unknown competitiveness '{other}'"
            ))),
        }
    }
}

/// Constant-elasticity demand model: `demand(p) = scale * p^elasticity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticityModel {
    pub industry: Industry,
    /// Negative: demand falls as price rises.
    pub price_elasticity: f64,
    /// Representative base demand.
    #[serde(skip)]
    pub scale: f64,
}

impl ElasticityModel {
    pub const fn new(industry: Industry, price_elasticity: f64, scale: f64) -> Self {
        Self {
            industry,
            price_elasticity,
            scale,
        }
    }

    /// Units demanded at `price`. The curve is undefined for non-positive prices.
    pub fn demand(&self, price: f64) -> Option<f64> {
        if price <= 0.0 || !price.is_finite() {
            return None;
        }
        Some(self.scale * price.powf(self.price_elasticity))
    }

    /// Same curve family with a caller-supplied coefficient.
    pub fn with_elasticity(self, price_elasticity: f64) -> Self {
        Self {
            price_elasticity,
            ..self
        }
    }
}

pub const FALLBACK_KEY: &str = "saas_medium";

const SAAS_MEDIUM: ElasticityModel = ElasticityModel::new(Industry::Saas, -1.2, 1000.0);

static MODELS: LazyLock<HashMap<&'static str, ElasticityModel>> = LazyLock::new(|| {
    HashMap::from([
        // SaaS: many substitutes, buyers compare on price
        ("saas_low", ElasticityModel::new(Industry::Saas, -0.8, 1000.0)),
        (FALLBACK_KEY, SAAS_MEDIUM),
        ("saas_high", ElasticityModel::new(Industry::Saas, -1.8, 1000.0)),
        // Agency: relationship loyalty dampens sensitivity
        ("agency_low", ElasticityModel::new(Industry::Agency, -0.6, 500.0)),
        ("agency_medium", ElasticityModel::new(Industry::Agency, -1.0, 500.0)),
        // Infrastructure: high switching costs
        (
            "infrastructure_low",
            ElasticityModel::new(Industry::Infrastructure, -0.4, 2000.0),
        ),
        (
            "infrastructure_medium",
            ElasticityModel::new(Industry::Infrastructure, -0.7, 2000.0),
        ),
    ])
});

pub fn model_key(industry: Industry, competitiveness: Competitiveness) -> String {
    format!("{}_{}", industry, competitiveness)
}

/// Looks up the model for a segment. Unknown combinations resolve to `saas_medium`.
pub fn select_model(industry: Industry, competitiveness: Competitiveness) -> ElasticityModel {
    let key = model_key(industry, competitiveness);
    match MODELS.get(key.as_str()) {
        Some(model) => *model,
        None => {
            debug!("No elasticity model for {}, using {}", key, FALLBACK_KEY);
            SAAS_MEDIUM
        }
    }
}

/// Samples `steps + 1` evenly spaced prices across `[min, max]`.
/// Prices are rounded to cents for display; demand uses the exact price.
pub fn generate_demand_curve(
    model: &ElasticityModel,
    min: f64,
    max: f64,
    steps: usize,
) -> Vec<DemandPoint> {
    if steps == 0 || max < min {
        return Vec::new();
    }
    let step = (max - min) / steps as f64;
    (0..=steps)
        .filter_map(|i| {
            let price = min + step * i as f64;
            model.demand(price).map(|demand| DemandPoint {
                price: round_cents(price),
                demand,
            })
        })
        .collect()
}

/// Revenue-maximizing point on a 100-step sample of the demand curve.
/// The first maximum wins; `base_price` is returned if nothing beats zero revenue.
pub fn find_revenue_maximizing_price(
    model: &ElasticityModel,
    base_price: f64,
    min: f64,
    max: f64,
) -> OptimalPrice {
    let mut best = OptimalPrice {
        optimal_price: base_price,
        max_revenue: 0.0,
    };
    for point in generate_demand_curve(model, min, max, 100) {
        let revenue = point.price * point.demand;
        if revenue > best.max_revenue {
            best = OptimalPrice {
                optimal_price: point.price,
                max_revenue: revenue,
            };
        }
    }
    best
}

/// Linear sensitivity check: what a relative price move does to demand and revenue.
pub fn price_elasticity_analysis(
    base_price: f64,
    base_demand: f64,
    elasticity: f64,
    price_change_percent: f64,
) -> ElasticityAnalysis {
    let new_price = base_price * (1.0 + price_change_percent);
    let new_demand = base_demand * (1.0 + elasticity * price_change_percent);

    let current_revenue = base_price * base_demand;
    let new_revenue = new_price * new_demand;

    ElasticityAnalysis {
        new_price,
        new_demand,
        revenue_change: safe_ratio(new_revenue - current_revenue, current_revenue) * 100.0,
        elasticity,
    }
}
