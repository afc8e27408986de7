//! Net-to-gross price engine
//!
//! Finds the listed price `gross` such that deducting every fee from it
//! leaves exactly the requested net amount:
//!
//! ```text
//! gross = net / (1 - Σ fee%/100)
//! ```

use serde::{Deserialize, Serialize};

use crate::types::FeeSet;

/// Relative tolerance for the net/gross reconciliation checks
pub const RECONCILE_TOLERANCE: f64 = 1e-9;

/// One fee's share of the gross price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeAmount {
    pub name: String,
    pub percent: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Amount the seller keeps
    pub net_value: f64,
    /// Effective total rate (fraction of 1)
    pub total_rate: f64,
    /// Listed selling price
    pub gross_price: f64,
    pub total_fees: f64,
    pub fees: Vec<FeeAmount>,
    /// gross - total fees; equals `net_value` up to rounding
    pub realized_net: f64,
}

impl PriceBreakdown {
    /// Whether `realized_net` reconciles to `net_value`
    pub fn reconciles(&self) -> bool {
        approx_eq(self.realized_net, self.net_value)
    }
}

/// Outcome of one pricing computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PricingResult {
    /// Net value missing, zero or negative: nothing to price yet
    Idle,
    Priced(PriceBreakdown),
    /// Effective rate >= 100 %, no finite gross price exists
    Unachievable { total_rate: f64 },
}

impl PricingResult {
    /// Gross price; `f64::INFINITY` when unachievable
    pub fn gross_price(&self) -> f64 {
        match self {
            PricingResult::Idle => 0.0,
            PricingResult::Priced(b) => b.gross_price,
            PricingResult::Unachievable { .. } => f64::INFINITY,
        }
    }

    /// Total fees; `f64::INFINITY` when unachievable
    pub fn total_fees(&self) -> f64 {
        match self {
            PricingResult::Idle => 0.0,
            PricingResult::Priced(b) => b.total_fees,
            PricingResult::Unachievable { .. } => f64::INFINITY,
        }
    }

    pub fn fee_amounts(&self) -> &[FeeAmount] {
        match self {
            PricingResult::Priced(b) => &b.fees,
            _ => &[],
        }
    }

    pub fn breakdown(&self) -> Option<&PriceBreakdown> {
        match self {
            PricingResult::Priced(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PricingResult::Idle)
    }

    pub fn is_unachievable(&self) -> bool {
        matches!(self, PricingResult::Unachievable { .. })
    }
}

/// Derive the gross selling price that leaves `net_value` after `fees`.
///
/// Pure and deterministic. Non-finite or non-positive `net_value` yields
/// [`PricingResult::Idle`]; an effective rate of 100 % or more (or a gross
/// price too large to represent) yields [`PricingResult::Unachievable`].
pub fn compute(net_value: f64, fees: &FeeSet) -> PricingResult {
    if !net_value.is_finite() || net_value <= 0.0 {
        return PricingResult::Idle;
    }

    let total_rate = fees.total_rate();
    if total_rate >= 1.0 {
        return PricingResult::Unachievable { total_rate };
    }

    let gross_price = net_value / (1.0 - total_rate);
    if !gross_price.is_finite() {
        return PricingResult::Unachievable { total_rate };
    }

    let total_fees = gross_price * total_rate;
    let fees = fees
        .iter()
        .map(|rate| FeeAmount {
            name: rate.name.clone(),
            percent: rate.percent,
            amount: gross_price * rate.fraction(),
        })
        .collect();

    PricingResult::Priced(PriceBreakdown {
        net_value,
        total_rate,
        gross_price,
        total_fees,
        fees,
        realized_net: gross_price - total_fees,
    })
}

/// Relative comparison with an absolute floor for values near zero
pub fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= RECONCILE_TOLERANCE * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ifood_fees(commission: f64) -> FeeSet {
        FeeSet::new()
            .with("commission", commission)
            .with("payment", 3.5)
            .with("anticipation", 1.59)
    }

    #[test]
    fn test_own_delivery_scenario() {
        let result = compute(50.0, &ifood_fees(12.0));
        let b = result.breakdown().expect("priced");

        assert!((b.total_rate - 0.1709).abs() < 1e-12);
        assert!((b.gross_price - 60.3063).abs() < 1e-4, "got {}", b.gross_price);
        assert!((b.total_fees - 10.3063).abs() < 1e-4, "got {}", b.total_fees);
        assert!(b.reconciles());
    }

    #[test]
    fn test_partner_delivery_scenario() {
        let result = compute(50.0, &ifood_fees(23.0));
        assert!((result.gross_price() - 69.5313).abs() < 1e-4);
    }

    #[test]
    fn test_exactly_one_hundred_percent_is_unachievable() {
        let fees = FeeSet::new().with("commission", 60.0).with("payment", 40.0);
        let result = compute(100.0, &fees);
        assert!(result.is_unachievable());
        assert_eq!(result.gross_price(), f64::INFINITY);
        assert!(result.fee_amounts().is_empty());
    }

    #[test]
    fn test_over_one_hundred_percent_is_unachievable() {
        let fees = FeeSet::new().with("commission", 99.0).with("payment", 3.5);
        assert!(matches!(
            compute(10.0, &fees),
            PricingResult::Unachievable { total_rate } if total_rate > 1.0
        ));
    }

    #[test]
    fn test_non_positive_net_is_idle() {
        let fees = ifood_fees(12.0);
        for net in [0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = compute(net, &fees);
            assert!(result.is_idle(), "net {net} should be idle");
            assert_eq!(result.gross_price(), 0.0);
            assert_eq!(result.total_fees(), 0.0);
        }
    }

    #[test]
    fn test_idle_wins_over_unachievable() {
        let fees = FeeSet::new().with("commission", 150.0);
        assert!(compute(0.0, &fees).is_idle());
    }

    #[test]
    fn test_negative_fee_is_a_discount() {
        let fees = FeeSet::new().with("commission", 10.0).with("promo", -5.0);
        let b = compute(95.0, &fees).breakdown().cloned().expect("priced");
        assert!((b.gross_price - 100.0).abs() < 1e-9);
        assert!((b.fees[1].amount + 5.0).abs() < 1e-9);
        assert!(b.reconciles());
    }

    #[test]
    fn test_empty_fee_set_prices_at_net() {
        let result = compute(42.0, &FeeSet::new());
        assert_eq!(result.gross_price(), 42.0);
        assert_eq!(result.total_fees(), 0.0);
    }

    #[test]
    fn test_overflowing_gross_is_unachievable() {
        let result = compute(f64::MAX, &FeeSet::new().with("commission", 50.0));
        assert!(result.is_unachievable());
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let b = compute(73.45, &ifood_fees(23.0))
            .breakdown()
            .cloned()
            .expect("priced");
        let sum: f64 = b.fees.iter().map(|f| f.amount).sum();
        assert!(approx_eq(sum, b.total_fees));
        assert_eq!(b.fees.len(), 3);
        assert_eq!(b.fees[0].name, "commission");
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let json = serde_json::to_value(compute(0.0, &FeeSet::new())).unwrap();
        assert_eq!(json["status"], "idle");

        let fees = FeeSet::new().with("commission", 100.0);
        let json = serde_json::to_value(compute(1.0, &fees)).unwrap();
        assert_eq!(json["status"], "unachievable");
        assert_eq!(json["total_rate"], 1.0);
    }
}
