//! Account collaborators consumed by the bet slip.
//!
//! Defines the read-only `AuthProvider` and `WalletProvider` traits the
//! slip is constructed with, and provides implementations for:
//! - `Session` — logged-in user and bearer token
//! - `SharedWallet` — balance cell refreshed from the betting API

pub mod session;
pub mod wallet;

use rust_decimal::Decimal;

pub use session::{Session, UserProfile};
pub use wallet::SharedWallet;

/// Who is using the client, if anyone.
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Whether a user is logged in with a token.
    fn is_authenticated(&self) -> bool;

    /// Current user profile, if logged in.
    fn user(&self) -> Option<UserProfile>;
}

/// Funds available for staking.
#[cfg_attr(test, mockall::automock)]
pub trait WalletProvider: Send + Sync {
    /// Latest known available balance.
    fn balance(&self) -> Decimal;
}
