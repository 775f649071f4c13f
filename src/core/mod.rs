//! Core business logic - framework-agnostic voting, budget and ranking operations.

/// Ledger sums: monthly budgets and lifetime totals
pub mod aggregate;
/// Budget rules and the validator
pub mod budget;
/// Language catalog
pub mod language;
/// Append-only vote storage
pub mod ledger;
/// Month keys
pub mod period;
/// Standings
pub mod ranking;
/// User upserts and lookups
pub mod user;
/// Vote submission service
pub mod vote;
