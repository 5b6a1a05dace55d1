//! Storefront REST API client.
//!
//! Thin wrapper over the four endpoints the client needs:
//! - `GET  {base}/matches`         — fixtures with odds
//! - `POST {base}/bets/place`      — submit a slip
//! - `GET  {base}/wallet/balance`  — available funds
//! - `GET  {base}/bets/history`    — placed bets
//!
//! Auth: `Authorization: Bearer {token}` on every call except fixtures.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::BettingApi;
use crate::history::BetRecord;
use crate::types::{BetReceipt, BetSubmission, MatchListing, WicketError};

const API_NAME: &str = "storefront";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

/// Most endpoints wrap their payload as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceBetResponse {
    bet_id: String,
    /// "accepted" | "rejected"
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: Decimal,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct HttpBettingApi {
    http: Client,
    base_url: String,
}

impl HttpBettingApi {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Request failed: {what}"))?;
        let response = Self::check_status(response).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse response: {what}"))?;
        Ok(envelope.data)
    }

    /// Turn a non-2xx response into `WicketError::Api`, using the body's
    /// `message` when there is one.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = Self::error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        warn!(status = status.as_u16(), message = %message, "Betting API error");
        Err(WicketError::Api {
            status: status.as_u16(),
            message,
        }
        .into())
    }

    fn error_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
    }

    fn to_receipt(resp: PlaceBetResponse, submission: &BetSubmission) -> BetReceipt {
        BetReceipt {
            bet_id: resp.bet_id,
            accepted: resp.status.eq_ignore_ascii_case("accepted"),
            message: resp.message,
            total_stake: submission.total_stake,
            potential_win: submission.potential_win,
            placed_at: Utc::now(),
        }
    }
}

#[async_trait]
impl BettingApi for HttpBettingApi {
    async fn matches(&self) -> Result<Vec<MatchListing>> {
        let request = self.http.get(self.url("matches"));
        let matches: Vec<MatchListing> = self.send(request, "matches").await?;
        debug!(count = matches.len(), "GET /matches");
        Ok(matches)
    }

    async fn place_bet(
        &self,
        submission: &BetSubmission,
        token: &SecretString,
    ) -> Result<BetReceipt> {
        debug!(
            selections = submission.selections.len(),
            total_stake = %submission.total_stake,
            "POST /bets/place"
        );
        let request = self
            .http
            .post(self.url("bets/place"))
            .bearer_auth(token.expose_secret())
            .json(submission);
        let resp: PlaceBetResponse = self.send(request, "place bet").await?;
        Ok(Self::to_receipt(resp, submission))
    }

    async fn balance(&self, token: &SecretString) -> Result<Decimal> {
        let request = self
            .http
            .get(self.url("wallet/balance"))
            .bearer_auth(token.expose_secret());
        let resp: BalanceResponse = self.send(request, "wallet balance").await?;
        Ok(resp.balance)
    }

    async fn bet_history(&self, token: &SecretString) -> Result<Vec<BetRecord>> {
        let request = self
            .http
            .get(self.url("bets/history"))
            .bearer_auth(token.expose_secret());
        self.send(request, "bet history").await
    }

    fn name(&self) -> &str {
        API_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
