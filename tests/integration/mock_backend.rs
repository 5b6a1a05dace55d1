//! Mock betting backend for integration testing.
//!
//! Provides a deterministic `BettingApi` implementation that accepts
//! bets, tracks balance and history, and can be forced to fail, all
//! in-memory with no external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use wicket::api::BettingApi;
use wicket::history::{BetRecord, BetStatus};
use wicket::types::*;

/// A mock backend for deterministic testing.
///
/// Fixtures, balance, settled history and submissions are fully
/// controllable from test code.
pub struct MockBackend {
    expected_token: String,
    fixtures: Arc<Mutex<Vec<MatchListing>>>,
    balance: Arc<Mutex<Decimal>>,
    history: Arc<Mutex<Vec<BetRecord>>>,
    submissions: Arc<Mutex<Vec<BetSubmission>>>,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
    /// If set, bets are answered with `accepted == false` and this message.
    reject_with: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    pub fn new(expected_token: &str, initial_balance: Decimal) -> Self {
        Self {
            expected_token: expected_token.to_string(),
            fixtures: Arc::new(Mutex::new(Self::board())),
            balance: Arc::new(Mutex::new(initial_balance)),
            history: Arc::new(Mutex::new(Self::settled_bets())),
            submissions: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
            reject_with: Arc::new(Mutex::new(None)),
        }
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Reject (not fail) every subsequent bet.
    pub fn reject_bets(&self, msg: &str) {
        *self.reject_with.lock().unwrap() = Some(msg.to_string());
    }

    /// Move money outside of any bet (e.g. a deposit elsewhere).
    pub fn set_balance(&self, balance: Decimal) {
        *self.balance.lock().unwrap() = balance;
    }

    /// Move the odds on a fixture, as a live market would.
    pub fn set_odds(&self, match_id: &str, odds1: Decimal, odds2: Decimal) {
        let mut fixtures = self.fixtures.lock().unwrap();
        if let Some(m) = fixtures.iter_mut().find(|m| m.id == match_id) {
            m.odds1 = odds1;
            m.odds2 = odds2;
        }
    }

    pub fn get_submissions(&self) -> Vec<BetSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    fn check(&self, token: &SecretString) -> Result<()> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        if token.expose_secret() != &self.expected_token {
            return Err(WicketError::Api {
                status: 401,
                message: "Invalid token".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn board() -> Vec<MatchListing> {
        vec![
            MatchListing {
                id: "101".to_string(),
                team1: "Mumbai Indians".to_string(),
                team2: "Chennai Super Kings".to_string(),
                odds1: dec!(1.86),
                odds2: dec!(1.85),
                status: MatchStatus::Live,
            },
            MatchListing {
                id: "102".to_string(),
                team1: "Royal Challengers Bengaluru".to_string(),
                team2: "Kolkata Knight Riders".to_string(),
                odds1: dec!(1.92),
                odds2: dec!(1.88),
                status: MatchStatus::Suspended,
            },
        ]
    }

    /// Two settled bets with known figures.
    fn settled_bets() -> Vec<BetRecord> {
        vec![
            BetRecord {
                id: "BET001".to_string(),
                placed_at: Utc.with_ymd_and_hms(2024, 5, 15, 19, 30, 0).unwrap(),
                match_name: "MI vs CSK".to_string(),
                market: "Match Winner".to_string(),
                selection: "Mumbai Indians".to_string(),
                odds: dec!(1.86),
                stake: dec!(1000),
                potential_win: dec!(1860),
                status: BetStatus::Won,
                profit: dec!(860),
            },
            BetRecord {
                id: "BET002".to_string(),
                placed_at: Utc.with_ymd_and_hms(2024, 5, 14, 19, 30, 0).unwrap(),
                match_name: "RCB vs KKR".to_string(),
                market: "Top Batsman".to_string(),
                selection: "Virat Kohli".to_string(),
                odds: dec!(3.25),
                stake: dec!(500),
                potential_win: dec!(1625),
                status: BetStatus::Lost,
                profit: dec!(-500),
            },
        ]
    }
}

#[async_trait]
impl BettingApi for MockBackend {
    async fn matches(&self) -> Result<Vec<MatchListing>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self.fixtures.lock().unwrap().clone())
    }

    async fn place_bet(
        &self,
        submission: &BetSubmission,
        token: &SecretString,
    ) -> Result<BetReceipt> {
        self.check(token)?;
        self.submissions.lock().unwrap().push(submission.clone());

        let bet_id = format!("MOCK-{}", Uuid::new_v4());
        let rejection = self.reject_with.lock().unwrap().clone();
        let mut balance = self.balance.lock().unwrap();
        let rejection = rejection.or_else(|| {
            (submission.total_stake > *balance).then(|| "Insufficient balance".to_string())
        });

        let receipt = BetReceipt {
            bet_id,
            accepted: rejection.is_none(),
            message: rejection,
            total_stake: submission.total_stake,
            potential_win: submission.potential_win,
            placed_at: Utc::now(),
        };
        if receipt.accepted {
            *balance -= submission.total_stake;
            self.history
                .lock()
                .unwrap()
                .push(BetRecord::pending(&receipt, submission));
        }
        Ok(receipt)
    }

    async fn balance(&self, token: &SecretString) -> Result<Decimal> {
        self.check(token)?;
        Ok(*self.balance.lock().unwrap())
    }

    async fn bet_history(&self, token: &SecretString) -> Result<Vec<BetRecord>> {
        self.check(token)?;
        Ok(self.history.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
