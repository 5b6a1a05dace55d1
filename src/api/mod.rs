//! Betting API integrations.
//!
//! Defines the `BettingApi` trait and provides implementations for:
//! - `HttpBettingApi` — the storefront REST API (fixtures, bets, wallet, history)
//! - `DryRunApi` — accepts everything locally, for offline use
//!
//! Odds, acceptance and settlement all happen behind this trait.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;
use std::sync::Mutex;
use tracing::info;

use crate::history::BetRecord;
use crate::types::{BetReceipt, BetSubmission, MatchListing};

pub use http::HttpBettingApi;

/// Abstraction over the external betting backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BettingApi: Send + Sync {
    /// Fixtures currently offered, with match-winner odds.
    async fn matches(&self) -> Result<Vec<MatchListing>>;

    /// Submit a finalised slip. A rejected bet is `Ok` with
    /// `accepted == false`; transport and HTTP failures are `Err`.
    async fn place_bet(&self, submission: &BetSubmission, token: &SecretString)
        -> Result<BetReceipt>;

    /// Current available balance.
    async fn balance(&self, token: &SecretString) -> Result<Decimal>;

    /// The user's placed bets.
    async fn bet_history(&self, token: &SecretString) -> Result<Vec<BetRecord>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// Local stand-in for the backend: serves fixed fixtures, accepts every
/// affordable bet, deducts the stake from an in-memory balance and
/// remembers it as pending.
#[derive(Debug)]
pub struct DryRunApi {
    fixtures: Vec<MatchListing>,
    balance: Mutex<Decimal>,
    placed: Mutex<Vec<BetRecord>>,
}

impl DryRunApi {
    pub fn new(balance: Decimal, fixtures: Vec<MatchListing>) -> Self {
        Self {
            fixtures,
            balance: Mutex::new(balance),
            placed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BettingApi for DryRunApi {
    async fn matches(&self) -> Result<Vec<MatchListing>> {
        Ok(self.fixtures.clone())
    }

    async fn place_bet(
        &self,
        submission: &BetSubmission,
        _token: &SecretString,
    ) -> Result<BetReceipt> {
        let receipt = {
            let mut balance = self.balance.lock().unwrap_or_else(|e| e.into_inner());
            if submission.total_stake > *balance {
                BetReceipt {
                    accepted: false,
                    message: Some("Insufficient balance".to_string()),
                    ..BetReceipt::dry_run(submission)
                }
            } else {
                *balance -= submission.total_stake;
                BetReceipt::dry_run(submission)
            }
        };

        if receipt.accepted {
            self.placed
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(BetRecord::pending(&receipt, submission));
        }
        info!(
            bet_id = %receipt.bet_id,
            accepted = receipt.accepted,
            total_stake = %submission.total_stake,
            "[DRY RUN] Bet placed"
        );
        Ok(receipt)
    }

    async fn balance(&self, _token: &SecretString) -> Result<Decimal> {
        Ok(*self.balance.lock().unwrap_or_else(|e| e.into_inner()))
    }

    async fn bet_history(&self, _token: &SecretString) -> Result<Vec<BetRecord>> {
        Ok(self.placed.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
