//! Currency formatting with Indian digit grouping (12,34,567.89).
//!
//! Presentation only. Nothing in the slip logic depends on these strings.
//! The `_in` variants take the configured currency symbol; the plain ones
//! use the rupee sign.

use rust_decimal::{Decimal, RoundingStrategy};

pub const RUPEE: &str = "₹";

/// Format an amount like `₹24,500` or `₹1,234.5` (at most two decimals,
/// trailing zeros dropped).
pub fn format_amount(amount: Decimal) -> String {
    format_amount_in(RUPEE, amount)
}

/// Format an amount with exactly two decimals, like `₹6,045.00`.
pub fn format_amount_2dp(amount: Decimal) -> String {
    format_amount_2dp_in(RUPEE, amount)
}

pub fn format_amount_in(symbol: &str, amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    render(symbol, rounded, None)
}

pub fn format_amount_2dp_in(symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    render(symbol, rounded, Some(2))
}

fn render(symbol: &str, amount: Decimal, fixed_dp: Option<usize>) -> String {
    let text = match fixed_dp {
        Some(dp) => format!("{:.*}", dp, amount.abs()),
        None => amount.abs().to_string(),
    };
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let mut out = format!("{sign}{symbol}{}", group_indian(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Group an unsigned digit string: last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
