//! Currency display
//!
//! Renders amounts as locale currency text. A price that does not exist is
//! always shown as a label, never as a number.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::pricing::PricingResult;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub thousands_separator: char,
    /// Shown instead of a price when no finite price exists
    pub unachievable_label: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::brl()
    }
}

impl CurrencyFormat {
    /// Brazilian real, pt-BR grouping
    pub fn brl() -> Self {
        Self {
            symbol: "R$".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            unachievable_label: "Preço inviável".to_string(),
        }
    }

    /// `R$ 1.234,56`, `-R$ 5,00`; non-finite values render the label
    pub fn format_amount(&self, value: f64) -> String {
        if !value.is_finite() {
            return self.unachievable_label.clone();
        }

        let (negative, digits) = match round_to_cents(value) {
            Some(cents) => (
                cents.is_sign_negative() && !cents.is_zero(),
                format!("{:.2}", cents.abs()),
            ),
            // outside Decimal's range
            None => (value < 0.0, format!("{:.2}", value.abs())),
        };
        let sign = if negative { "-" } else { "" };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((&digits, "00"));

        format!(
            "{}{} {}{}{}",
            sign,
            self.symbol,
            group_thousands(int_part, self.thousands_separator),
            self.decimal_separator,
            frac_part
        )
    }

    pub fn format_gross(&self, result: &PricingResult) -> String {
        match result {
            PricingResult::Unachievable { .. } => self.unachievable_label.clone(),
            other => self.format_amount(other.gross_price()),
        }
    }

    pub fn format_fees(&self, result: &PricingResult) -> String {
        match result {
            PricingResult::Unachievable { .. } => self.unachievable_label.clone(),
            other => self.format_amount(other.total_fees()),
        }
    }

    /// `17,09%`
    pub fn format_percent(&self, percent: f64) -> String {
        if !percent.is_finite() {
            return "-".to_string();
        }
        format!("{:.2}%", percent).replace('.', &self.decimal_separator.to_string())
    }
}

/// Round half away from zero to two decimal places
pub fn round_to_cents(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
