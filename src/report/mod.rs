//! Text reports: load overview, key indicators, decomposition, annual table, glossary.

pub mod format;

pub use format::*;
