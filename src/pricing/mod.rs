//! Pricing: the net-to-gross engine and per-plan comparison.

pub mod engine;

pub use engine::{approx_eq, compute, FeeAmount, PriceBreakdown, PricingResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DeliveryPlan, FeeSet};

/// One plan's quote for a net value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanQuote {
    pub plan: DeliveryPlan,
    pub label: String,
    pub fees: FeeSet,
    pub result: PricingResult,
}

/// Every plan priced against the same net value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteReport {
    pub net_value: f64,
    pub plans: Vec<PlanQuote>,
    pub computed_at: DateTime<Utc>,
}

impl QuoteReport {
    pub fn get(&self, plan: DeliveryPlan) -> Option<&PlanQuote> {
        self.plans.iter().find(|q| q.plan == plan)
    }

    /// Achievable plan with the lowest gross price
    pub fn cheapest(&self) -> Option<&PlanQuote> {
        self.plans
            .iter()
            .filter(|q| matches!(q.result, PricingResult::Priced(_)))
            .min_by(|a, b| a.result.gross_price().total_cmp(&b.result.gross_price()))
    }
}

/// Price each plan independently, preserving input order
pub fn compare_plans<'a, I>(net_value: f64, plans: I) -> Vec<PlanQuote>
where
    I: IntoIterator<Item = (DeliveryPlan, &'a FeeSet)>,
{
    plans
        .into_iter()
        .map(|(plan, fees)| PlanQuote {
            plan,
            label: plan.label().to_string(),
            fees: fees.clone(),
            result: compute(net_value, fees),
        })
        .collect()
}
