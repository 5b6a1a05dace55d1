//! WICKET — bet-slip aggregation for a cricket betting client
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod account;
pub mod api;
pub mod config;
pub mod history;
pub mod money;
pub mod slip;
pub mod types;
