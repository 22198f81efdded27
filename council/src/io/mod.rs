//! I/O helpers for council commands.

pub mod briefing;
pub mod config;
pub mod ledger_store;
pub mod state;
