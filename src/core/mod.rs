//! Tunable numbers and pure combat math shared by the engine and the predictor.

pub mod combat_math;
pub mod constants;
