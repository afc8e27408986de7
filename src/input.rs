//! Free-text input sanitisation
//!
//! Users type amounts the way they read them ("R$ 1.234,56", "50,00",
//! "3.5%"). Anything that does not parse becomes 0 so the engine only ever
//! sees plain numbers.

/// Parse a money amount typed by a user. Unparseable text yields 0.0.
pub fn parse_net_value(text: &str) -> f64 {
    parse_number(text).unwrap_or(0.0)
}

/// Parse a fee percentage typed by a user. Unparseable text yields 0.0.
pub fn parse_percent(text: &str) -> f64 {
    parse_number(text.trim().trim_end_matches('%')).unwrap_or(0.0)
}

/// Lenient number parser accepting `,` or `.` as decimal separator.
///
/// When both separators appear the rightmost one is the decimal mark. A
/// separator repeated more than once is a thousands separator. A single `.`
/// is a decimal point (`"1.5"`), except after an `R$` prefix with exactly
/// three digits following it, where pt-BR grouping is meant (`"R$ 1.500"`).
pub fn parse_number(text: &str) -> Option<f64> {
    let brl = text.trim().starts_with("R$");
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .trim_start_matches('$')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches(',').count() > 1 => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replace(',', "."),
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        (Some(dot), None) if brl && is_grouped_thousands(&cleaned[dot + 1..]) => {
            cleaned.replace('.', "")
        }
        _ => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_grouped_thousands(tail: &str) -> bool {
    tail.len() == 3 && tail.bytes().all(|b| b.is_ascii_digit())
}
