//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The API bearer token is referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

use crate::money::RUPEE;
use crate::slip::quick::DEFAULT_QUICK_STAKE;
use crate::slip::validation::StakeRules;
use crate::types::{MatchListing, WicketError};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    #[serde(default)]
    pub slip: SlipConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub matches: Vec<MatchListing>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub name: String,
    /// Prefix for displayed amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    RUPEE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SlipConfig {
    pub min_stake: Decimal,
    pub quick_stakes: Vec<Decimal>,
    pub quick_bet_default_stake: Decimal,
}

impl Default for SlipConfig {
    fn default() -> Self {
        let rules = StakeRules::default();
        Self {
            min_stake: rules.min_stake,
            quick_stakes: rules.quick_stakes,
            quick_bet_default_stake: DEFAULT_QUICK_STAKE,
        }
    }
}

impl SlipConfig {
    pub fn stake_rules(&self) -> StakeRules {
        StakeRules {
            min_stake: self.min_stake,
            quick_stakes: self.quick_stakes.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// When false the client runs against the local dry-run backend.
    pub enabled: bool,
    pub base_url: String,
    /// Name of the env var holding the bearer token.
    pub token_env: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WalletConfig {
    /// Starting balance for the dry-run backend.
    pub demo_balance: Decimal,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            demo_balance: dec!(24500),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and sanity-check configuration text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), WicketError> {
        if self.slip.min_stake <= Decimal::ZERO {
            return Err(WicketError::Config("slip.min_stake must be positive".into()));
        }
        if let Some(bad) = self.slip.quick_stakes.iter().find(|s| **s < self.slip.min_stake) {
            return Err(WicketError::Config(format!(
                "quick stake {bad} is below slip.min_stake {}",
                self.slip.min_stake
            )));
        }
        if let Some(m) = self
            .matches
            .iter()
            .find(|m| m.odds1 < Decimal::ONE || m.odds2 < Decimal::ONE)
        {
            return Err(WicketError::Config(format!(
                "match {} has odds below 1.0",
                m.id
            )));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
