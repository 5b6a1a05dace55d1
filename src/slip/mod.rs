//! Bet slip aggregation.
//!
//! Owns the pending selections, the stake entered against each, the
//! single/multiple bet type and the per-selection validation errors.
//! Callers mutate the slip in response to user input and read
//! `compute_totals` / `can_submit` afterwards; nothing is pushed.

pub mod quick;
pub mod validation;

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::account::{AuthProvider, WalletProvider};
use crate::types::{BetSubmission, BetType, Selection, SlipTotals, WicketError};
use validation::{parse_stake, validate_stake, StakeError, StakeRules};

/// What `add_selection` / `toggle_selection` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Same id or same outcome already on the slip; nothing changed.
    Duplicate,
    /// Toggle hit an existing outcome and took it off the slip.
    Removed,
    /// Odds below 1.0; the selection cannot be priced.
    InvalidOdds,
}

// ---------------------------------------------------------------------------
// Bet slip
// ---------------------------------------------------------------------------

/// Pending bet slip.
///
/// Invariant: every key of `stakes` and `errors` is the id of a selection
/// currently on the slip.
pub struct BetSlip {
    rules: StakeRules,
    wallet: Arc<dyn WalletProvider>,
    auth: Arc<dyn AuthProvider>,
    selections: Vec<Selection>,
    stakes: HashMap<String, Decimal>,
    errors: HashMap<String, StakeError>,
    bet_type: BetType,
    /// Balance the current `errors` were computed against.
    validated_balance: Decimal,
}

impl BetSlip {
    pub fn new(
        rules: StakeRules,
        wallet: Arc<dyn WalletProvider>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let validated_balance = wallet.balance();
        Self {
            rules,
            wallet,
            auth,
            selections: Vec::new(),
            stakes: HashMap::new(),
            errors: HashMap::new(),
            bet_type: BetType::Single,
            validated_balance,
        }
    }

    // -- Selections -------------------------------------------------------

    /// Append a selection unless the slip already holds it (same id, or
    /// same match/market/outcome).
    pub fn add_selection(&mut self, selection: Selection) -> AddOutcome {
        if selection.odds < Decimal::ONE {
            warn!(
                selection_id = %selection.id,
                odds = %selection.odds,
                "Selection with odds below 1.0 refused"
            );
            return AddOutcome::InvalidOdds;
        }
        if self.find_existing(&selection).is_some() {
            debug!(selection_id = %selection.id, "Selection already on slip");
            return AddOutcome::Duplicate;
        }
        debug!(
            selection_id = %selection.id,
            odds = %selection.odds,
            "Selection added"
        );
        self.selections.push(selection);
        AddOutcome::Added
    }

    /// Re-click semantics: add the selection, or remove the matching one
    /// if it is already on the slip.
    pub fn toggle_selection(&mut self, selection: Selection) -> AddOutcome {
        match self.find_existing(&selection) {
            Some(idx) => {
                let id = self.selections[idx].id.clone();
                self.remove_selection(&id);
                AddOutcome::Removed
            }
            None => self.add_selection(selection),
        }
    }

    /// Remove a selection with its stake and error. Returns false when the
    /// id is unknown.
    pub fn remove_selection(&mut self, id: &str) -> bool {
        let before = self.selections.len();
        self.selections.retain(|s| s.id != id);
        if self.selections.len() == before {
            return false;
        }
        self.stakes.remove(id);
        self.errors.remove(id);
        self.enforce_bet_type();
        debug!(selection_id = id, remaining = self.selections.len(), "Selection removed");
        true
    }

    /// Empty the slip and reset the bet type.
    pub fn clear_all(&mut self) {
        self.selections.clear();
        self.stakes.clear();
        self.errors.clear();
        self.bet_type = BetType::Single;
        debug!("Bet slip cleared");
    }

    fn find_existing(&self, selection: &Selection) -> Option<usize> {
        self.selections
            .iter()
            .position(|s| s.id == selection.id || s.same_outcome(selection))
    }

    // -- Stakes -----------------------------------------------------------

    /// Record the stake typed for a selection and validate it.
    ///
    /// The parsed value is stored even when invalid so the input stays as
    /// typed; the error blocks submission until corrected. Unknown ids are
    /// ignored.
    pub fn set_stake(&mut self, id: &str, raw: &str) -> Result<(), StakeError> {
        if !self.contains(id) {
            warn!(selection_id = id, "Stake for unknown selection ignored");
            return Ok(());
        }
        let stake = parse_stake(raw);
        self.sync_balance();
        self.stakes.insert(id.to_string(), stake);
        let result = self.validate_one(id, stake);
        debug!(selection_id = id, stake = %stake, valid = result.is_ok(), "Stake set");
        result
    }

    /// Put the same stake on every selection, overwriting what was typed,
    /// and validate each one.
    pub fn apply_quick_stake(&mut self, amount: Decimal) {
        self.sync_balance();
        let ids: Vec<String> = self.selections.iter().map(|s| s.id.clone()).collect();
        for id in &ids {
            self.stakes.insert(id.clone(), amount);
            let _ = self.validate_one(id, amount);
        }
        debug!(amount = %amount, selections = ids.len(), "Quick stake applied");
    }

    /// Re-check every stored stake against the current balance.
    pub fn revalidate(&mut self) {
        self.validated_balance = self.wallet.balance();
        let stakes: Vec<(String, Decimal)> =
            self.stakes.iter().map(|(id, s)| (id.clone(), *s)).collect();
        for (id, stake) in stakes {
            let _ = self.validate_one(&id, stake);
        }
    }

    /// Revalidate when the wallet reports a different balance than the
    /// one the current errors were computed against.
    fn sync_balance(&mut self) {
        let balance = self.wallet.balance();
        if balance != self.validated_balance {
            debug!(
                old = %self.validated_balance,
                new = %balance,
                "Balance changed, revalidating stakes"
            );
            self.revalidate();
        }
    }

    fn validate_one(&mut self, id: &str, stake: Decimal) -> Result<(), StakeError> {
        match validate_stake(stake, self.validated_balance, &self.rules) {
            Ok(()) => {
                self.errors.remove(id);
                Ok(())
            }
            Err(e) => {
                self.errors.insert(id.to_string(), e.clone());
                Err(e)
            }
        }
    }

    // -- Bet type ---------------------------------------------------------

    /// Switch bet type. `Multiple` needs at least two selections; a
    /// refused switch returns false and changes nothing.
    pub fn set_bet_type(&mut self, bet_type: BetType) -> bool {
        if bet_type == BetType::Multiple && self.selections.len() < 2 {
            warn!(
                selections = self.selections.len(),
                "Multiple needs at least two selections"
            );
            return false;
        }
        self.bet_type = bet_type;
        true
    }

    fn enforce_bet_type(&mut self) {
        if self.selections.len() < 2 && self.bet_type != BetType::Single {
            debug!("Fewer than two selections, reverting to single");
            self.bet_type = BetType::Single;
        }
    }

    // -- Reads ------------------------------------------------------------

    /// Total stake, combined odds and potential payout.
    ///
    /// Singles use the first selection's odds against the whole stake;
    /// multiples multiply every selection's odds. Every figure saturates
    /// at `Decimal::MAX` instead of overflowing.
    pub fn compute_totals(&mut self) -> SlipTotals {
        self.sync_balance();
        if self.selections.is_empty() {
            return SlipTotals::default();
        }

        let total_stake: Decimal = self
            .selections
            .iter()
            .filter_map(|s| self.stakes.get(&s.id))
            .fold(Decimal::ZERO, |acc, stake| acc.saturating_add(*stake));

        let combined_odds = match self.bet_type {
            BetType::Single => self.selections[0].odds,
            BetType::Multiple => self
                .selections
                .iter()
                .fold(Decimal::ONE, |acc, s| acc.saturating_mul(s.odds)),
        };

        SlipTotals {
            total_stake,
            combined_odds,
            potential_win: total_stake.saturating_mul(combined_odds),
        }
    }

    /// Logged in, at least one selection, and no stake errors.
    pub fn can_submit(&mut self) -> bool {
        self.sync_balance();
        self.auth.is_authenticated() && !self.selections.is_empty() && self.errors.is_empty()
    }

    /// Build the payload for the betting API.
    ///
    /// Fails with the first reason the slip cannot be placed. A slip with
    /// nothing staked is refused as well, and so is one whose payout
    /// saturated.
    pub fn prepare_submission(&mut self) -> Result<BetSubmission, WicketError> {
        self.sync_balance();
        if !self.auth.is_authenticated() {
            return Err(WicketError::NotAuthenticated);
        }
        if self.selections.is_empty() {
            return Err(WicketError::EmptySlip);
        }
        if !self.errors.is_empty() {
            return Err(WicketError::InvalidStakes {
                count: self.errors.len(),
            });
        }

        let totals = self.compute_totals();
        if totals.total_stake.is_zero() {
            return Err(WicketError::ZeroStake);
        }
        if totals.combined_odds == Decimal::MAX || totals.potential_win == Decimal::MAX {
            return Err(WicketError::PayoutOverflow);
        }

        let submission = BetSubmission {
            selections: self.selections.clone(),
            stakes: self
                .selections
                .iter()
                .map(|s| (s.id.clone(), self.stake(&s.id)))
                .collect(),
            bet_type: self.bet_type,
            total_stake: totals.total_stake,
            potential_win: totals.potential_win,
        };
        info!(
            selections = submission.selections.len(),
            bet_type = %submission.bet_type,
            total_stake = %submission.total_stake,
            potential_win = %submission.potential_win,
            "Bet submission prepared"
        );
        Ok(submission)
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selections.iter().any(|s| s.id == id)
    }

    /// Stake entered for a selection (zero when none).
    pub fn stake(&self, id: &str) -> Decimal {
        self.stakes.get(id).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn error(&self, id: &str) -> Option<&StakeError> {
        self.errors.get(id)
    }

    pub fn errors(&self) -> &HashMap<String, StakeError> {
        &self.errors
    }

    pub fn bet_type(&self) -> BetType {
        self.bet_type
    }

    pub fn rules(&self) -> &StakeRules {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl std::fmt::Debug for BetSlip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BetSlip")
            .field("selections", &self.selections.len())
            .field("bet_type", &self.bet_type)
            .field("stakes", &self.stakes)
            .field("errors", &self.errors)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
