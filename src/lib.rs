//! The `walletgate` service authenticates wallet holders with a signed challenge, issues session
//! tokens and gates access to a content storage node and an on-chain allow-list behind them.

/// Command-line arguments.
pub mod args;
/// Service configuration structure and loading logic.
pub mod config;
/// The main application entry point and server setup logic.
pub mod run;

mod auth;
mod docs;
mod nonce;
mod routes;
mod services;
mod session;
mod signed;
mod state;
mod time;
mod wallet;
