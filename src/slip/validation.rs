//! Stake parsing and validation rules.
//!
//! Two rules only: a stake above zero must reach the configured minimum,
//! and no stake may exceed the available balance. Both failures are
//! recoverable by editing the stake.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::money;
use crate::types::DEFAULT_MIN_STAKE;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Stake limits and presets shared by the bet slip and quick bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRules {
    /// Smallest non-zero stake accepted.
    pub min_stake: Decimal,
    /// One-click stake presets.
    pub quick_stakes: Vec<Decimal>,
}

impl Default for StakeRules {
    fn default() -> Self {
        Self {
            min_stake: DEFAULT_MIN_STAKE,
            quick_stakes: vec![dec!(100), dec!(500), dec!(1000), dec!(2000)],
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a stake is not acceptable. Scoped to one selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StakeError {
    #[error("Minimum stake is {}", money::format_amount(*minimum))]
    BelowMinimum { minimum: Decimal },

    #[error("Insufficient balance")]
    InsufficientBalance { stake: Decimal, available: Decimal },
}

// ---------------------------------------------------------------------------
// Parsing & validation
// ---------------------------------------------------------------------------

/// Parse user input into a stake.
///
/// Reads the leading decimal number (`"250abc"` is 250). Empty,
/// non-numeric and negative input all become zero. A number too large
/// for `Decimal` becomes `Decimal::MAX` so it still fails the balance
/// check.
pub fn parse_stake(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit || trimmed.starts_with('-') {
        return Decimal::ZERO;
    }

    let number = trimmed[..end]
        .trim_start_matches('+')
        .trim_end_matches('.');
    let number = if number.starts_with('.') {
        format!("0{number}")
    } else {
        number.to_string()
    };
    // Excess fraction digits may fail to fit; the integer part alone
    // only fails on overflow.
    let int_part = number.split('.').next().unwrap_or("0");
    Decimal::from_str(&number)
        .or_else(|_| Decimal::from_str(int_part))
        .unwrap_or(Decimal::MAX)
}

/// Check a stake against the minimum and the available balance.
///
/// A zero stake is "not entered yet" and passes.
pub fn validate_stake(
    stake: Decimal,
    balance: Decimal,
    rules: &StakeRules,
) -> Result<(), StakeError> {
    if stake > Decimal::ZERO && stake < rules.min_stake {
        return Err(StakeError::BelowMinimum {
            minimum: rules.min_stake,
        });
    }
    if stake > balance {
        return Err(StakeError::InsufficientBalance {
            stake,
            available: balance,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
