//! Financial projection calculator.
//!
//! Savings, health-cost and weight projections from event collections and
//! reduction targets. Empty or unpriced inputs short-circuit to zero.

use crate::ConsumptionEvent;
use serde::{Deserialize, Serialize};

/// Health cost avoided per 1000 g of ethanol not drunk over a year
pub const HEALTH_COST_PER_KG_YEAR: f64 = 2000.0;

/// kcal per kg of body fat
pub const KCAL_PER_KG_FAT: f64 = 7700.0;

/// kcal per gram of ethanol
pub const KCAL_PER_GRAM_ETHANOL: f64 = 7.0;

/// Savings projected over three horizons
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct SavingsProjection {
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

/// Spend against a budget for some period
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct BudgetStatus {
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
}

/// Unspent budget, never negative
pub fn savings(budget: f64, actual_spending: f64) -> f64 {
    (budget - actual_spending).max(0.0)
}

/// Project savings if spend drops by `target_reduction_percent`
///
/// The per-day figure is total known spend divided by the number of events,
/// not by distinct drinking days. Downstream projections depend on that
/// divisor, so same-day events are not merged.
pub fn projected_savings(
    events: &[ConsumptionEvent],
    target_reduction_percent: f64,
) -> SavingsProjection {
    let priced: Vec<f64> = events.iter().filter_map(|e| e.price).collect();
    if priced.is_empty() {
        return SavingsProjection::default();
    }

    let total_spending: f64 = priced.iter().sum();
    let average_per_day = total_spending / events.len() as f64;
    let daily_saving = (average_per_day * target_reduction_percent / 100.0).max(0.0);

    tracing::debug!(
        "Projecting savings from {} events ({} priced), daily saving {:.2}",
        events.len(),
        priced.len(),
        daily_saving
    );

    SavingsProjection {
        weekly: daily_saving * 7.0,
        monthly: daily_saving * 30.0,
        yearly: daily_saving * 365.0,
    }
}

/// Daily health-cost saving from drinking `reduced_alcohol_grams_per_week` less
pub fn health_savings_estimate(reduced_alcohol_grams_per_week: f64) -> f64 {
    let yearly_grams = reduced_alcohol_grams_per_week * 52.0;
    let yearly_amount = yearly_grams / 1000.0 * HEALTH_COST_PER_KG_YEAR;
    (yearly_amount / 365.0).max(0.0)
}

/// Kilograms of fat equivalent to a daily calorie reduction over `days`
pub fn weight_impact(reduced_calories_per_day: f64, days: f64) -> f64 {
    (reduced_calories_per_day * days / KCAL_PER_KG_FAT).max(0.0)
}

/// Calories supplied by `alcohol_grams` of ethanol
pub fn alcohol_calories(alcohol_grams: f64) -> f64 {
    (alcohol_grams * KCAL_PER_GRAM_ETHANOL).max(0.0)
}

/// Known spend of `events` measured against `budget`
pub fn budget_status<'a, I>(budget: f64, events: I) -> BudgetStatus
where
    I: IntoIterator<Item = &'a ConsumptionEvent>,
{
    let spent: f64 = events.into_iter().map(ConsumptionEvent::spend).sum();
    BudgetStatus {
        budget,
        spent,
        remaining: savings(budget, spent),
    }
}
