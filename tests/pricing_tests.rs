//! Tests for the net-to-gross engine

use delivery_pricing::format::CurrencyFormat;
use delivery_pricing::pricing::{approx_eq, compare_plans, compute, PricingResult};
use delivery_pricing::types::{DeliveryPlan, FeeSet};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

fn platform_fees(commission: f64) -> FeeSet {
    FeeSet::new()
        .with("commission", commission)
        .with("payment", 3.5)
        .with("anticipation", 1.59)
}

/// Up to four fees of 0..20 % each, so the total stays below 100 %
fn bounded_fees(raw: &[u16]) -> FeeSet {
    raw.iter()
        .take(4)
        .enumerate()
        .map(|(i, p)| (format!("fee{}", i), f64::from(p % 2000) / 100.0))
        .collect()
}

/// Positive net value in cents, 0.01 ..= 10_000_000.00
fn net_from(cents: u32) -> f64 {
    f64::from(cents % 1_000_000_000 + 1) / 100.0
}

// ============================================================================
// Platform scenarios
// ============================================================================

#[test]
fn test_own_delivery_quote_for_fifty() {
    let result = compute(50.0, &platform_fees(12.0));

    assert!((result.gross_price() - 60.3063).abs() < 1e-4);
    assert!((result.total_fees() - 10.3063).abs() < 1e-4);
    assert_eq!(CurrencyFormat::brl().format_gross(&result), "R$ 60,31");
    assert_eq!(CurrencyFormat::brl().format_fees(&result), "R$ 10,31");
}

#[test]
fn test_partner_delivery_quote_for_fifty() {
    let result = compute(50.0, &platform_fees(23.0));

    assert!((result.gross_price() - 69.5313).abs() < 1e-4);
    assert_eq!(CurrencyFormat::brl().format_gross(&result), "R$ 69,53");
}

#[test]
fn test_hundred_percent_is_unachievable() {
    let fees = FeeSet::new().with("commission", 60.0).with("payment", 40.0);
    let result = compute(100.0, &fees);

    assert!(result.is_unachievable());
    assert_eq!(result.gross_price(), f64::INFINITY);
    assert_eq!(CurrencyFormat::brl().format_gross(&result), "Preço inviável");
}

#[test]
fn test_missing_net_is_idle_for_both_plans() {
    let own = platform_fees(12.0);
    let partner = platform_fees(23.0);

    for net in [0.0, -10.0, f64::NAN] {
        let quotes = compare_plans(
            net,
            [(DeliveryPlan::Own, &own), (DeliveryPlan::Partner, &partner)],
        );
        assert!(quotes.iter().all(|q| q.result == PricingResult::Idle));
        assert_eq!(CurrencyFormat::brl().format_gross(&quotes[0].result), "R$ 0,00");
    }
}

#[test]
fn test_partner_always_costs_more_than_own() {
    let own = platform_fees(12.0);
    let partner = platform_fees(23.0);

    for net in [1.0, 19.9, 50.0, 1234.56] {
        assert!(compute(net, &partner).gross_price() > compute(net, &own).gross_price());
    }
}

// ============================================================================
// Properties
// ============================================================================

#[quickcheck]
fn gross_minus_fees_returns_the_net(cents: u32, raw: Vec<u16>) -> bool {
    let net = net_from(cents);
    let fees = bounded_fees(&raw);
    match compute(net, &fees) {
        PricingResult::Priced(b) => {
            approx_eq(b.gross_price * (1.0 - b.total_rate), net) && b.reconciles()
        }
        _ => false,
    }
}

#[quickcheck]
fn fee_amounts_sum_to_total_fees(cents: u32, raw: Vec<u16>) -> bool {
    let fees = bounded_fees(&raw);
    let result = compute(net_from(cents), &fees);
    let sum: f64 = result.fee_amounts().iter().map(|f| f.amount).sum();

    result.fee_amounts().len() == fees.len()
        && (sum - result.total_fees()).abs() <= 1e-9 * result.gross_price().max(1.0)
}

#[quickcheck]
fn non_positive_net_is_idle(net: f64, raw: Vec<u16>) -> TestResult {
    if net.is_finite() && net > 0.0 {
        return TestResult::discard();
    }
    TestResult::from_bool(compute(net, &bounded_fees(&raw)).is_idle())
}

#[quickcheck]
fn rate_at_or_above_one_is_unachievable(cents: u32, extra: u16) -> bool {
    let fees = FeeSet::new()
        .with("commission", 100.0)
        .with("other", f64::from(extra % 5000) / 100.0);
    compute(net_from(cents), &fees).is_unachievable()
}

#[quickcheck]
fn compute_is_deterministic(cents: u32, raw: Vec<u16>) -> bool {
    let net = net_from(cents);
    let fees = bounded_fees(&raw);
    let a = compute(net, &fees);
    let b = compute(net, &fees);
    a.gross_price().to_bits() == b.gross_price().to_bits() && a == b
}

#[quickcheck]
fn adding_a_fee_never_lowers_the_price(cents: u32, raw: Vec<u16>, extra: u16) -> bool {
    let net = net_from(cents);
    let fees = bounded_fees(&raw);
    let more = fees.clone().with("extra", f64::from(extra % 1000) / 100.0);
    compute(net, &more).gross_price() >= compute(net, &fees).gross_price()
}
