//! Bet history views.
//!
//! Filters placed bets by status tab and search text, and computes the
//! summary statistics shown above the history table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money;
use crate::types::{BetReceipt, BetSubmission, BetType, Selection};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Settlement state of a placed bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetStatus {
    Won,
    Lost,
    Pending,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Won => write!(f, "WON"),
            BetStatus::Lost => write!(f, "LOST"),
            BetStatus::Pending => write!(f, "PENDING"),
        }
    }
}

/// A bet as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRecord {
    pub id: String,
    pub placed_at: DateTime<Utc>,
    #[serde(rename = "match")]
    pub match_name: String,
    pub market: String,
    pub selection: String,
    pub odds: Decimal,
    pub stake: Decimal,
    pub potential_win: Decimal,
    pub status: BetStatus,
    /// Realised profit: winnings minus stake, negative stake when lost,
    /// zero while pending.
    #[serde(default)]
    pub profit: Decimal,
}

impl BetRecord {
    /// Pending record for a submission the API just accepted.
    pub fn pending(receipt: &BetReceipt, submission: &BetSubmission) -> Self {
        let odds = match submission.bet_type {
            BetType::Single => submission
                .selections
                .first()
                .map(|s| s.odds)
                .unwrap_or(Decimal::ZERO),
            BetType::Multiple => submission
                .selections
                .iter()
                .fold(Decimal::ONE, |acc, s| acc.saturating_mul(s.odds)),
        };
        BetRecord {
            id: receipt.bet_id.clone(),
            placed_at: receipt.placed_at,
            match_name: joined(&submission.selections, |s| &s.match_name),
            market: joined(&submission.selections, |s| &s.market_name),
            selection: joined(&submission.selections, |s| &s.selection_name),
            odds,
            stake: submission.total_stake,
            potential_win: submission.potential_win,
            status: BetStatus::Pending,
            profit: Decimal::ZERO,
        }
    }
}

fn joined(selections: &[Selection], field: impl Fn(&Selection) -> &String) -> String {
    selections
        .iter()
        .map(|s| field(s).as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

impl fmt::Display for BetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} | {} | {} @ {:.2} | stake {} | win {} | {}",
            self.id,
            self.placed_at.format("%Y-%m-%d"),
            self.match_name,
            self.selection,
            self.odds,
            money::format_amount(self.stake),
            money::format_amount(self.potential_win),
            self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Status tabs above the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryTab {
    All,
    Won,
    Lost,
    Pending,
}

impl HistoryTab {
    pub const ALL: &'static [HistoryTab] = &[
        HistoryTab::All,
        HistoryTab::Won,
        HistoryTab::Lost,
        HistoryTab::Pending,
    ];

    fn admits(&self, status: BetStatus) -> bool {
        match self {
            HistoryTab::All => true,
            HistoryTab::Won => status == BetStatus::Won,
            HistoryTab::Lost => status == BetStatus::Lost,
            HistoryTab::Pending => status == BetStatus::Pending,
        }
    }
}

impl std::str::FromStr for HistoryTab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(HistoryTab::All),
            "won" => Ok(HistoryTab::Won),
            "lost" => Ok(HistoryTab::Lost),
            "pending" => Ok(HistoryTab::Pending),
            _ => Err(anyhow::anyhow!("Unknown history tab: {s}")),
        }
    }
}

/// Aggregate figures over a set of bets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub total_bets: usize,
    pub total_stake: Decimal,
    /// Gross returns on won bets.
    pub total_won: Decimal,
    /// Stakes lost on lost bets.
    pub total_lost: Decimal,
    pub net_profit: Decimal,
    /// Won / resolved, as a percentage with one decimal.
    pub win_rate: Decimal,
}

impl fmt::Display for HistoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bets={} staked={} won={} lost={} net={} win_rate={}%",
            self.total_bets,
            money::format_amount(self.total_stake),
            money::format_amount(self.total_won),
            money::format_amount(self.total_lost),
            money::format_amount(self.net_profit),
            self.win_rate,
        )
    }
}

/// In-memory view over the user's bets.
#[derive(Debug, Clone, Default)]
pub struct BetHistory {
    bets: Vec<BetRecord>,
}

impl BetHistory {
    pub fn new(mut bets: Vec<BetRecord>) -> Self {
        bets.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Self { bets }
    }

    /// Newest first.
    pub fn bets(&self) -> &[BetRecord] {
        &self.bets
    }

    /// Bets on the given tab whose match name contains `search`
    /// (case-insensitive). An empty search matches everything.
    pub fn filter(&self, tab: HistoryTab, search: &str) -> Vec<&BetRecord> {
        let needle = search.trim().to_lowercase();
        self.bets
            .iter()
            .filter(|b| tab.admits(b.status))
            .filter(|b| needle.is_empty() || b.match_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Number of bets on each tab, in `HistoryTab::ALL` order.
    pub fn tab_counts(&self) -> Vec<(HistoryTab, usize)> {
        HistoryTab::ALL
            .iter()
            .map(|tab| (*tab, self.bets.iter().filter(|b| tab.admits(b.status)).count()))
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let mut stats = HistoryStats {
            total_bets: self.bets.len(),
            ..Default::default()
        };
        let mut won = 0u32;
        let mut lost = 0u32;

        for bet in &self.bets {
            stats.total_stake = stats.total_stake.saturating_add(bet.stake);
            match bet.status {
                BetStatus::Won => {
                    won += 1;
                    stats.total_won = stats.total_won.saturating_add(bet.potential_win);
                    stats.net_profit = stats
                        .net_profit
                        .saturating_add(bet.potential_win.saturating_sub(bet.stake));
                }
                BetStatus::Lost => {
                    lost += 1;
                    stats.total_lost = stats.total_lost.saturating_add(bet.stake);
                    stats.net_profit = stats.net_profit.saturating_sub(bet.stake);
                }
                BetStatus::Pending => {}
            }
        }

        let resolved = won + lost;
        if resolved > 0 {
            stats.win_rate = (Decimal::from(won) / Decimal::from(resolved) * dec!(100)).round_dp(1);
        }
        stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
