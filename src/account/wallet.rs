//! Wallet balance cell.
//!
//! The slip reads the balance synchronously; a refresh from the betting
//! API may land at any time from an async task. Clones share one cell.

use anyhow::Result;
use rust_decimal::Decimal;
use secrecy::SecretString;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use super::WalletProvider;
use crate::api::BettingApi;

#[derive(Debug, Clone, Default)]
pub struct SharedWallet {
    balance: Arc<RwLock<Decimal>>,
}

impl SharedWallet {
    pub fn new(initial: Decimal) -> Self {
        Self {
            balance: Arc::new(RwLock::new(initial)),
        }
    }

    /// Overwrite the balance (e.g. after an API response).
    pub fn set_balance(&self, balance: Decimal) {
        let mut cell = self.balance.write().unwrap_or_else(|e| e.into_inner());
        debug!(old = %*cell, new = %balance, "Wallet balance updated");
        *cell = balance;
    }

    /// Fetch the balance from the API and store it.
    pub async fn refresh(&self, api: &dyn BettingApi, token: &SecretString) -> Result<Decimal> {
        let balance = api.balance(token).await?;
        self.set_balance(balance);
        info!(balance = %balance, "Wallet refreshed");
        Ok(balance)
    }
}

impl WalletProvider for SharedWallet {
    fn balance(&self) -> Decimal {
        *self.balance.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBettingApi;
    use rust_decimal_macros::dec;

    #[test]
    fn test_clones_share_balance() {
        let wallet = SharedWallet::new(dec!(24500));
        let view = wallet.clone();
        wallet.set_balance(dec!(100));
        assert_eq!(view.balance(), dec!(100));
    }

    #[tokio::test]
    async fn test_refresh_from_api() {
        let mut api = MockBettingApi::new();
        api.expect_balance().times(1).returning(|_| Ok(dec!(750)));

        let wallet = SharedWallet::new(dec!(24500));
        let token = SecretString::new("tok".into());
        let balance = wallet.refresh(&api, &token).await.unwrap();
        assert_eq!(balance, dec!(750));
        assert_eq!(wallet.balance(), dec!(750));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_balance() {
        let mut api = MockBettingApi::new();
        api.expect_balance()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let wallet = SharedWallet::new(dec!(24500));
        let token = SecretString::new("tok".into());
        assert!(wallet.refresh(&api, &token).await.is_err());
        assert_eq!(wallet.balance(), dec!(24500));
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(SharedWallet::default().balance(), Decimal::ZERO);
    }
}
