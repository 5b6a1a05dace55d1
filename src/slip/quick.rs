//! Quick bet: one selection, one stake, placed straight from the odds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::debug;

use super::validation::{parse_stake, StakeError, StakeRules};
use crate::types::{BetSubmission, BetType, Selection, WicketError};

/// Stake pre-filled when the quick bet opens.
pub const DEFAULT_QUICK_STAKE: Decimal = dec!(100);

#[derive(Debug, Clone)]
pub struct QuickBet {
    selection: Selection,
    stake: Decimal,
    rules: StakeRules,
}

impl QuickBet {
    pub fn new(selection: Selection, rules: StakeRules) -> Self {
        Self::with_stake(selection, rules, DEFAULT_QUICK_STAKE)
    }

    pub fn with_stake(selection: Selection, rules: StakeRules, stake: Decimal) -> Self {
        Self {
            selection,
            stake,
            rules,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn stake(&self) -> Decimal {
        self.stake
    }

    /// Parse typed input; garbage becomes zero.
    pub fn set_stake_raw(&mut self, raw: &str) {
        self.stake = parse_stake(raw);
        debug!(stake = %self.stake, "Quick bet stake typed");
    }

    /// Pick one of the configured presets. Returns false (no change) for
    /// amounts that are not presets.
    pub fn select_preset(&mut self, amount: Decimal) -> bool {
        if !self.rules.quick_stakes.contains(&amount) {
            return false;
        }
        self.stake = amount;
        true
    }

    /// Whether `amount` is the preset currently in use.
    pub fn is_preset_selected(&self, amount: Decimal) -> bool {
        self.stake == amount && self.rules.quick_stakes.contains(&amount)
    }

    pub fn potential_win(&self) -> Decimal {
        self.stake.saturating_mul(self.selection.odds)
    }

    /// The stake reaches the minimum. Balance is the API's call here.
    pub fn can_place(&self) -> bool {
        self.stake >= self.rules.min_stake
    }

    /// Payload for a single bet on this selection.
    pub fn into_submission(self) -> Result<BetSubmission, WicketError> {
        if !self.can_place() {
            return Err(StakeError::BelowMinimum {
                minimum: self.rules.min_stake,
            }
            .into());
        }
        let potential_win = self.potential_win();
        if potential_win == Decimal::MAX {
            return Err(WicketError::PayoutOverflow);
        }
        Ok(BetSubmission {
            stakes: HashMap::from([(self.selection.id.clone(), self.stake)]),
            selections: vec![self.selection],
            bet_type: BetType::Single,
            total_stake: self.stake,
            potential_win,
        })
    }
}
