//! End-to-end slip flows: pick odds, stake, place, and read back history
//! through the mock backend.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use wicket::account::{Session, SharedWallet, UserProfile, WalletProvider};
use wicket::api::BettingApi;
use wicket::history::{BetHistory, BetStatus, HistoryTab};
use wicket::slip::quick::QuickBet;
use wicket::slip::validation::{StakeError, StakeRules};
use wicket::slip::BetSlip;
use wicket::types::*;

use crate::mock_backend::MockBackend;

const TOKEN: &str = "test-token";

fn token() -> SecretString {
    SecretString::new(TOKEN.to_string())
}

fn user() -> UserProfile {
    UserProfile {
        id: "1".into(),
        name: "John Doe".into(),
        email: "john@example.com".into(),
    }
}

fn listing(id: &str, odds1: Decimal, odds2: Decimal) -> MatchListing {
    MatchListing {
        id: id.into(),
        team1: format!("Home {id}"),
        team2: format!("Away {id}"),
        odds1,
        odds2,
        status: MatchStatus::Live,
    }
}

struct Harness {
    backend: MockBackend,
    session: Arc<Session>,
    wallet: SharedWallet,
    slip: BetSlip,
}

async fn harness(balance: Decimal) -> Harness {
    let backend = MockBackend::new(TOKEN, balance);
    let session = Arc::new(Session::authenticated(user(), token()));
    let wallet = SharedWallet::default();
    wallet.refresh(&backend, &token()).await.unwrap();
    let slip = BetSlip::new(StakeRules::default(), Arc::new(wallet.clone()), session.clone());
    Harness {
        backend,
        session,
        wallet,
        slip,
    }
}

#[tokio::test]
async fn test_single_bet_round_trip() {
    let mut h = harness(dec!(24500)).await;
    let sel = Selection::match_winner(&listing("1", dec!(1.86), dec!(1.85)), TeamSide::Team1).unwrap();
    let id = sel.id.clone();
    h.slip.add_selection(sel);
    h.slip.set_stake(&id, "1000").unwrap();

    let totals = h.slip.compute_totals();
    assert_eq!(totals.total_stake, dec!(1000));
    assert_eq!(totals.potential_win, dec!(1860));

    let submission = h.slip.prepare_submission().unwrap();
    let receipt = h.backend.place_bet(&submission, &token()).await.unwrap();
    assert!(receipt.accepted);

    h.wallet.refresh(&h.backend, &token()).await.unwrap();
    assert_eq!(h.wallet.balance(), dec!(23500));

    let history = BetHistory::new(h.backend.bet_history(&token()).await.unwrap());
    let pending = history.filter(HistoryTab::Pending, "");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].stake, dec!(1000));
    assert_eq!(pending[0].status, BetStatus::Pending);
}

#[tokio::test]
async fn test_accumulator_payload() {
    let mut h = harness(dec!(24500)).await;
    let a = Selection::match_winner(&listing("1", dec!(1.86), dec!(1.85)), TeamSide::Team1).unwrap();
    let b = Selection::match_winner(&listing("2", dec!(1.92), dec!(3.25)), TeamSide::Team2).unwrap();
    h.slip.add_selection(a);
    h.slip.add_selection(b);
    assert!(h.slip.set_bet_type(BetType::Multiple));
    h.slip.apply_quick_stake(dec!(500));

    let submission = h.slip.prepare_submission().unwrap();
    assert_eq!(submission.bet_type, BetType::Multiple);
    assert_eq!(submission.total_stake, dec!(1000));
    assert_eq!(submission.potential_win, dec!(6045));

    h.backend.place_bet(&submission, &token()).await.unwrap();
    let sent = h.backend.get_submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].selections.len(), 2);

    let history = BetHistory::new(h.backend.bet_history(&token()).await.unwrap());
    let pending = history.filter(HistoryTab::Pending, "");
    let placed = pending[0];
    assert_eq!(placed.odds, dec!(6.045));
    assert_eq!(placed.match_name, "Home 1 vs Away 1 / Home 2 vs Away 2");
}

#[tokio::test]
async fn test_wallet_refresh_invalidates_stakes() {
    let mut h = harness(dec!(2000)).await;
    let sel = Selection::match_winner(&listing("1", dec!(1.86), dec!(1.85)), TeamSide::Team1).unwrap();
    let id = sel.id.clone();
    h.slip.add_selection(sel);
    h.slip.set_stake(&id, "1500").unwrap();
    assert!(h.slip.can_submit());

    // Balance drops elsewhere; the slip notices on its next read.
    h.backend.set_balance(dec!(1000));
    h.wallet.refresh(&h.backend, &token()).await.unwrap();
    assert!(!h.slip.can_submit());
    assert!(matches!(
        h.slip.error(&id),
        Some(StakeError::InsufficientBalance { .. })
    ));

    h.slip.set_stake(&id, "1000").unwrap();
    assert!(h.slip.can_submit());
}

#[tokio::test]
async fn test_logout_blocks_submission() {
    let mut h = harness(dec!(24500)).await;
    let sel = Selection::match_winner(&listing("1", dec!(1.86), dec!(1.85)), TeamSide::Team2).unwrap();
    let id = sel.id.clone();
    h.slip.add_selection(sel);
    h.slip.set_stake(&id, "100").unwrap();
    assert!(h.slip.can_submit());

    h.session.logout();
    assert!(!h.slip.can_submit());
    assert!(matches!(
        h.slip.prepare_submission(),
        Err(WicketError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_rejected_bet_keeps_balance() {
    let h = harness(dec!(24500)).await;
    h.backend.reject_bets("Odds changed");
    let sel = Selection::match_winner(&listing("1", dec!(1.86), dec!(1.85)), TeamSide::Team1).unwrap();
    let quick = QuickBet::new(sel, StakeRules::default());
    let receipt = h
        .backend
        .place_bet(&quick.into_submission().unwrap(), &token())
        .await
        .unwrap();
    assert!(!receipt.accepted);
    assert_eq!(receipt.message.as_deref(), Some("Odds changed"));
    assert_eq!(h.backend.balance(&token()).await.unwrap(), dec!(24500));
}

#[tokio::test]
async fn test_backend_failure_surfaces() {
    let h = harness(dec!(24500)).await;
    h.backend.set_error("connection reset");
    assert!(h.wallet.refresh(&h.backend, &token()).await.is_err());
    // Last known balance survives a failed refresh.
    assert_eq!(h.wallet.balance(), dec!(24500));

    h.backend.clear_error();
    let bad = SecretString::new("wrong".to_string());
    let err = h.backend.balance(&bad).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<WicketError>(),
        Some(WicketError::Api { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_picks_use_backend_fixtures() {
    let mut h = harness(dec!(24500)).await;
    h.backend.set_odds("101", dec!(2.10), dec!(1.70));
    let board = assert_ok!(h.backend.matches().await);
    assert_eq!(board.len(), 2);

    let live = board.iter().find(|m| m.id == "101").unwrap();
    let sel = assert_ok!(Selection::match_winner(live, TeamSide::Team1));
    assert_eq!(sel.match_id, "101");
    assert_eq!(sel.odds, dec!(2.10));
    let id = sel.id.clone();
    h.slip.add_selection(sel);
    assert_ok!(h.slip.set_stake(&id, "100"));
    assert_eq!(h.slip.compute_totals().potential_win, dec!(210));

    let suspended = board.iter().find(|m| m.id == "102").unwrap();
    assert!(matches!(
        assert_err!(Selection::match_winner(suspended, TeamSide::Team2)),
        WicketError::MarketClosed { .. }
    ));

    h.backend.set_error("gateway timeout");
    assert_err!(h.backend.matches().await);
}

#[tokio::test]
async fn test_oversized_stake_never_reaches_backend() {
    let mut h = harness(dec!(24500)).await;
    let sel = Selection::match_winner(&listing("1", dec!(1.86), dec!(1.85)), TeamSide::Team1).unwrap();
    let id = sel.id.clone();
    h.slip.add_selection(sel);
    assert!(matches!(
        h.slip.set_stake(&id, "100000000000000000000000000000"),
        Err(StakeError::InsufficientBalance { .. })
    ));
    assert_eq!(h.slip.compute_totals().potential_win, Decimal::MAX);
    assert!(matches!(
        h.slip.prepare_submission(),
        Err(WicketError::InvalidStakes { count: 1 })
    ));
    assert!(h.backend.get_submissions().is_empty());
}

#[tokio::test]
async fn test_history_stats_over_backend() {
    let h = harness(dec!(24500)).await;
    let history = BetHistory::new(h.backend.bet_history(&token()).await.unwrap());
    let stats = history.stats();
    assert_eq!(stats.total_bets, 2);
    assert_eq!(stats.net_profit, dec!(360));
    assert_eq!(stats.win_rate, dec!(50));
    assert_eq!(history.filter(HistoryTab::All, "csk").len(), 1);
}
