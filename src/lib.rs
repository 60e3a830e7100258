//! Balance Tracker
//!
//! This crate tracks accounts, recurring subscriptions and revenue sources
//! and projects per-account and total balances in USD for any target date by
//! replaying recurring cash-flow events against account base amounts.

pub mod core;
pub mod rates;
pub mod store;
