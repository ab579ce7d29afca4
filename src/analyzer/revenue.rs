use crate::analyzer::elasticity::ElasticityModel;
use crate::model::{PricingError, PricingScenario, RevenueLiftResult};
use crate::utils::safe_ratio;

/// Share of the base kept no matter how aggressive the churn assumptions are.
pub const RETENTION_FLOOR: f64 = 0.5;

fn screen(scenario: &PricingScenario) -> Result<(), PricingError> {
    let prices = [scenario.current_price, scenario.new_price];
    if prices.iter().any(|p| !p.is_finite()) {
        return Err(PricingError::InvalidInput("prices must be finite".into()));
    }
    if scenario.current_price == 0.0 {
        return Err(PricingError::DivisionUndefined);
    }
    if prices.iter().any(|&p| p < 0.0) {
        return Err(PricingError::InvalidInput("prices must not be negative".into()));
    }
    if scenario.current_customers == 0 {
        return Err(PricingError::InvalidInput(
            "at least one current customer is required".into(),
        ));
    }
    Ok(())
}

/// Projects a year of revenue before and after a price change.
///
/// Elasticity turns the relative price move into a customer-loss fraction,
/// which is added to baseline monthly churn. Retention never drops below
/// [`RETENTION_FLOOR`]. Customers lost are credited back at their
/// acquisition cost in `net_profit_impact`.
pub fn calculate_revenue_lift(
    scenario: &PricingScenario,
    model: &ElasticityModel,
) -> Result<RevenueLiftResult, PricingError> {
    screen(scenario)?;

    let elasticity = scenario.price_elasticity.unwrap_or(model.price_elasticity);
    let customers = f64::from(scenario.current_customers);

    let price_change_percent = (scenario.new_price - scenario.current_price) / scenario.current_price;
    let customer_loss_percent = (price_change_percent * elasticity).abs();

    let total_churn = scenario.average_churn / 100.0 / 12.0 + customer_loss_percent;
    let new_customer_count = (customers * (1.0 - total_churn)).max(customers * RETENTION_FLOOR);

    let current_annual_revenue = scenario.current_price * customers * 12.0;
    let new_annual_revenue = scenario.new_price * new_customer_count * 12.0;
    let revenue_lift = new_annual_revenue - current_annual_revenue;

    let customers_lost = customers - new_customer_count;
    let saved_cac = customers_lost * scenario.customer_acquisition_cost;

    Ok(RevenueLiftResult {
        current_annual_revenue,
        new_annual_revenue,
        revenue_lift,
        revenue_lift_percent: safe_ratio(revenue_lift, current_annual_revenue) * 100.0,
        customer_churn_impact: customers_lost,
        net_gain: revenue_lift.max(0.0),
        break_even_customers: safe_ratio(current_annual_revenue, scenario.new_price * 12.0),
        net_profit_impact: revenue_lift + saved_cac,
    })
}

/// Runs every scenario against the same model; stops at the first invalid one.
pub fn compare_scenarios(
    scenarios: &[PricingScenario],
    model: &ElasticityModel,
) -> Result<Vec<RevenueLiftResult>, PricingError> {
    scenarios
        .iter()
        .map(|scenario| calculate_revenue_lift(scenario, model))
        .collect()
}
