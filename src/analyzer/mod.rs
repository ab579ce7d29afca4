// Analyzer module: aggregates the pricing calculators.

pub mod elasticity;
pub mod inflation;
pub mod optimizer;
pub mod price_analysis;
pub mod revenue;
pub mod statistics;

// Re-export the entry points for ease of use.
pub use elasticity::{Competitiveness, ElasticityModel, Industry, select_model};
pub use inflation::{
    calculate_inflation_impact, calculate_inflation_impact_at, project_inflation_scenario,
    suggest_price_adjustment,
};
pub use optimizer::{PriceRange, find_optimal_price};
pub use price_analysis::{Analyzer, AnalyzerImpl, analyze_csv_data, detect_pricing_anomalies};
pub use revenue::{calculate_revenue_lift, compare_scenarios};
