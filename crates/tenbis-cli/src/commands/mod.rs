//! Subcommand implementations.

pub mod load_credit;
pub mod notify_test;
pub mod refresh_token;
pub mod status;
