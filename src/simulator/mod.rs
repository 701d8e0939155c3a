//! Batch win-rate prediction for matchup balancing.
//!
//! The predictor drives the same duel engine the game uses (src/combat/engine.rs)
//! with a no-op event sink, so predicted odds match real fights.

mod config;
mod predictor;
mod report;

pub use config::{MatchupFile, SimConfig};
pub use predictor::{predict_win_rate, win_percentage};
pub use report::{PredictionReport, TrialResult};
