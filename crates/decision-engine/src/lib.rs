//! Decision engine crate.
//!
//! Turns validated campaign metrics into an ordered pause / budget action
//! plan. Pure and synchronous: no I/O, no shared state.

pub mod budget;
pub mod engine;
pub mod filter;
pub mod rules;
pub mod types;

pub use engine::DecisionEngine;
pub use filter::NameFilter;
pub use rules::{Rule, RULE_CHAIN};
pub use types::{RuleOutcome, RulePolicy, Verdict};
