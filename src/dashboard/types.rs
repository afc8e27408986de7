//! Dashboard API Types
//!
//! DTOs for HTTP communication with the calculator frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::CurrencyFormat;
use crate::pricing::{FeeAmount, PlanQuote, PricingResult, QuoteReport};
use crate::types::{DeliveryPlan, FeeSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
}

/// One plan's quote, with display strings ready for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanQuoteResponse {
    pub plan: DeliveryPlan,
    pub label: String,
    /// "idle", "priced" or "unachievable"
    pub status: String,
    pub total_percent: f64,
    /// None when no finite price exists
    pub gross_price: Option<f64>,
    pub total_fees: Option<f64>,
    pub gross_display: String,
    pub fees_display: String,
    pub fees: Vec<FeeAmount>,
}

impl PlanQuoteResponse {
    pub fn from_quote(quote: &PlanQuote, format: &CurrencyFormat) -> Self {
        let status = match quote.result {
            PricingResult::Idle => "idle",
            PricingResult::Priced(_) => "priced",
            PricingResult::Unachievable { .. } => "unachievable",
        };
        let finite = |v: f64| v.is_finite().then_some(v);

        Self {
            plan: quote.plan,
            label: quote.label.clone(),
            status: status.to_string(),
            total_percent: quote.fees.total_percent(),
            gross_price: finite(quote.result.gross_price()),
            total_fees: finite(quote.result.total_fees()),
            gross_display: format.format_gross(&quote.result),
            fees_display: format.format_fees(&quote.result),
            fees: quote.result.fee_amounts().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub net_value: f64,
    pub net_display: String,
    pub plans: Vec<PlanQuoteResponse>,
    pub cheapest: Option<DeliveryPlan>,
    pub computed_at: DateTime<Utc>,
}

impl QuoteResponse {
    pub fn from_report(report: &QuoteReport, format: &CurrencyFormat) -> Self {
        Self {
            net_value: report.net_value,
            net_display: format.format_amount(report.net_value),
            plans: report
                .plans
                .iter()
                .map(|q| PlanQuoteResponse::from_quote(q, format))
                .collect(),
            cheapest: report.cheapest().map(|q| q.plan),
            computed_at: report.computed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFeesResponse {
    pub plan: DeliveryPlan,
    pub label: String,
    pub storage_key: String,
    pub fees: FeeSet,
    pub total_percent: f64,
}

/// Standard API envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
