//! Rounding and formatting at the display boundary

use bigdecimal::{BigDecimal, RoundingMode};

use crate::types::*;

/// Round half-up to `scale` decimal places
pub fn round_for_display(amount: &BigDecimal, scale: i64) -> BigDecimal {
    amount.with_scale_round(scale, RoundingMode::HalfUp)
}

/// Format an amount with thousands separators, e.g. `-1,234,567.80`
pub fn format_amount(amount: &BigDecimal, scale: i64) -> String {
    let rounded = round_for_display(amount, scale).to_string();
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format a variance percentage, e.g. `33.33%`
pub fn format_percent(percent: &BigDecimal, scale: i64) -> String {
    format!("{}%", round_for_display(percent, scale))
}

/// One-line summary of a totals block
pub fn summarize_totals(totals: &ReconciliationTotals, scale: i64) -> String {
    format!(
        "external {} / internal {} / variance {} ({})",
        format_amount(&totals.external_total, scale),
        format_amount(&totals.internal_total, scale),
        format_amount(&totals.variance, scale),
        format_percent(&totals.variance_percent, scale),
    )
}
