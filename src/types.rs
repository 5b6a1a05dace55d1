//! Shared types for the WICKET client.
//!
//! These types form the data model used across all modules.
//! They are kept free of slip logic so that the aggregator, the API
//! wrapper, and the history views can depend on them without cycles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::slip::validation::StakeError;

/// Market id used for the head-to-head winner market on every fixture.
pub const MATCH_WINNER_MARKET_ID: &str = "match-winner";
const MATCH_WINNER_MARKET_NAME: &str = "Match Winner";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Lifecycle of a listed match as reported by the betting API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Live,
    Upcoming,
    Suspended,
    Completed,
}

impl MatchStatus {
    /// Whether odds on this match can currently be added to a slip.
    pub fn is_open(&self) -> bool {
        matches!(self, MatchStatus::Live | MatchStatus::Upcoming)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Live => write!(f, "LIVE"),
            MatchStatus::Upcoming => write!(f, "Upcoming"),
            MatchStatus::Suspended => write!(f, "SUSPENDED"),
            MatchStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Which side of a head-to-head fixture was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Team1,
    Team2,
}

impl TeamSide {
    /// Stable selection id used by the match-winner market.
    pub fn selection_id(&self) -> &'static str {
        match self {
            TeamSide::Team1 => "team1",
            TeamSide::Team2 => "team2",
        }
    }
}

impl std::str::FromStr for TeamSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "team1" | "home" => Ok(TeamSide::Team1),
            "2" | "team2" | "away" => Ok(TeamSide::Team2),
            _ => Err(anyhow::anyhow!("Unknown side: {s} (expected 1 or 2)")),
        }
    }
}

/// A match listing with head-to-head decimal odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListing {
    pub id: String,
    pub team1: String,
    pub team2: String,
    pub odds1: Decimal,
    pub odds2: Decimal,
    pub status: MatchStatus,
}

impl MatchListing {
    /// Display name, e.g. "Mumbai Indians vs Chennai Super Kings".
    pub fn name(&self) -> String {
        format!("{} vs {}", self.team1, self.team2)
    }

    pub fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Team1 => &self.team1,
            TeamSide::Team2 => &self.team2,
        }
    }

    pub fn odds(&self, side: TeamSide) -> Decimal {
        match side {
            TeamSide::Team1 => self.odds1,
            TeamSide::Team2 => self.odds2,
        }
    }
}

impl fmt::Display for MatchListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({:.2}) vs {} ({:.2}) | {}",
            self.id, self.team1, self.odds1, self.team2, self.odds2, self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// One chosen outcome a user may bet on.
///
/// Never mutated after creation. The stake placed on it lives in the
/// slip's stake map, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Client-generated id, unique within a slip.
    pub id: String,
    pub match_id: String,
    pub match_name: String,
    pub market_id: String,
    pub market_name: String,
    pub selection_id: String,
    pub selection_name: String,
    /// Decimal odds (payout multiplier including stake), always >= 1.0.
    pub odds: Decimal,
}

impl Selection {
    /// Build a selection, generating its id from the match, the picked
    /// outcome name and the current time in milliseconds.
    pub fn new(
        match_id: impl Into<String>,
        match_name: impl Into<String>,
        market_id: impl Into<String>,
        market_name: impl Into<String>,
        selection_id: impl Into<String>,
        selection_name: impl Into<String>,
        odds: Decimal,
    ) -> Result<Self, WicketError> {
        if odds < Decimal::ONE {
            return Err(WicketError::InvalidOdds(odds));
        }
        let match_id = match_id.into();
        let selection_name = selection_name.into();
        let id = format!(
            "{match_id}-{selection_name}-{}",
            Utc::now().timestamp_millis()
        );
        Ok(Self {
            id,
            match_id,
            match_name: match_name.into(),
            market_id: market_id.into(),
            market_name: market_name.into(),
            selection_id: selection_id.into(),
            selection_name,
            odds,
        })
    }

    /// Selection on the match-winner market of a listed fixture.
    pub fn match_winner(listing: &MatchListing, side: TeamSide) -> Result<Self, WicketError> {
        if !listing.status.is_open() {
            return Err(WicketError::MarketClosed {
                match_id: listing.id.clone(),
                status: listing.status,
            });
        }
        Self::new(
            listing.id.clone(),
            listing.name(),
            MATCH_WINNER_MARKET_ID,
            MATCH_WINNER_MARKET_NAME,
            side.selection_id(),
            listing.team(side),
            listing.odds(side),
        )
    }

    /// Key identifying the underlying outcome regardless of the generated id.
    pub fn outcome_key(&self) -> (&str, &str, &str) {
        (&self.match_id, &self.market_id, &self.selection_id)
    }

    /// Whether both selections point at the same outcome.
    pub fn same_outcome(&self, other: &Selection) -> bool {
        self.outcome_key() == other.outcome_key()
    }

    /// Helper to build a test selection with fixed ids.
    #[cfg(test)]
    pub fn sample(match_id: &str, selection_id: &str, odds: Decimal) -> Self {
        Selection {
            id: format!("{match_id}-{selection_id}"),
            match_id: match_id.to_string(),
            match_name: format!("Match {match_id}"),
            market_id: MATCH_WINNER_MARKET_ID.to_string(),
            market_name: MATCH_WINNER_MARKET_NAME.to_string(),
            selection_id: selection_id.to_string(),
            selection_name: selection_id.to_uppercase(),
            odds,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}: {} @ {:.2}",
            self.match_name, self.market_name, self.selection_name, self.odds,
        )
    }
}

// ---------------------------------------------------------------------------
// Bet type
// ---------------------------------------------------------------------------

/// How the stakes on a slip are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    /// One stake against one outcome.
    #[default]
    Single,
    /// Accumulator: one stake against the product of all odds.
    Multiple,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetType::Single => write!(f, "Single"),
            BetType::Multiple => write!(f, "Multiple"),
        }
    }
}

impl std::str::FromStr for BetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" | "singles" => Ok(BetType::Single),
            "multiple" | "multi" | "acca" | "parlay" => Ok(BetType::Multiple),
            _ => Err(anyhow::anyhow!("Unknown bet type: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Totals & submission
// ---------------------------------------------------------------------------

/// Output of a totals computation over the slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlipTotals {
    pub total_stake: Decimal,
    /// Odds applied to the total stake (first selection for singles,
    /// product of all selections for multiples). Zero on an empty slip.
    pub combined_odds: Decimal,
    pub potential_win: Decimal,
}

impl fmt::Display for SlipTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stake={} odds={:.3} potential_win={}",
            crate::money::format_amount(self.total_stake),
            self.combined_odds,
            crate::money::format_amount_2dp(self.potential_win),
        )
    }
}

/// Finalised payload handed to the betting API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSubmission {
    pub selections: Vec<Selection>,
    /// Selection id → stake.
    pub stakes: HashMap<String, Decimal>,
    pub bet_type: BetType,
    pub total_stake: Decimal,
    pub potential_win: Decimal,
}

/// Accept/reject outcome returned by the betting API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetReceipt {
    pub bet_id: String,
    pub accepted: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub total_stake: Decimal,
    pub potential_win: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl BetReceipt {
    /// Receipt for a bet that was only logged, never sent.
    pub fn dry_run(submission: &BetSubmission) -> Self {
        BetReceipt {
            bet_id: format!("DRY-{}", uuid::Uuid::new_v4()),
            accepted: true,
            message: Some("dry run".to_string()),
            total_stake: submission.total_stake,
            potential_win: submission.potential_win,
            placed_at: Utc::now(),
        }
    }
}

impl fmt::Display for BetReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.accepted { "ACCEPTED" } else { "REJECTED" };
        write!(
            f,
            "{verdict} [{}] stake={} potential_win={}",
            self.bet_id,
            crate::money::format_amount(self.total_stake),
            crate::money::format_amount_2dp(self.potential_win),
        )?;
        if let Some(msg) = &self.message {
            write!(f, " ({msg})")?;
        }
        Ok(())
    }
}

/// Minimum stake applied when no configuration overrides it.
pub const DEFAULT_MIN_STAKE: Decimal = dec!(10);

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for WICKET.
#[derive(Debug, thiserror::Error)]
pub enum WicketError {
    #[error("Invalid odds {0}: decimal odds must be at least 1.0")]
    InvalidOdds(Decimal),

    #[error("Market closed on match {match_id} ({status})")]
    MarketClosed { match_id: String, status: MatchStatus },

    #[error("Login required to place bets")]
    NotAuthenticated,

    #[error("Bet slip is empty")]
    EmptySlip,

    #[error("{count} selection(s) have invalid stakes")]
    InvalidStakes { count: usize },

    #[error("Total stake is zero")]
    ZeroStake,

    #[error("Potential win is too large to place")]
    PayoutOverflow,

    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error("Betting API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
