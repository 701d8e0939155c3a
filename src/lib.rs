//! Mobduel - turn-meter duel engine for monster battles
//!
//! Resolves a fight between two combatants given their stats, traits and
//! weapons. A single engine serves animated playback (every event recorded),
//! batch runs and the Monte Carlo win-rate predictor.

pub mod combat;
pub mod core;
pub mod simulator;

#[cfg(test)]
mod test_support;

pub use combat::{resolve_duel, resolve_duel_with_events, CombatantProfile, DuelOutcome, Registry};
