//! Prediction configuration and matchup files.

use serde::{Deserialize, Serialize};

use crate::combat::{CombatantProfile, DuelError, Registry};
use crate::core::constants::{DEFAULT_PREDICTOR_TRIALS, PREDICTOR_SAFETY_CAP};

/// Configuration for a win-rate prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of independent duels to run
    pub trials: u32,

    /// Base seed for reproducibility (None = entropy). Trial `i` uses `seed + i`.
    pub seed: Option<u64>,

    /// Resolved meters per duel before it is called on HP
    pub max_resolutions: u32,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per trial)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_PREDICTOR_TRIALS,
            seed: None,
            max_resolutions: PREDICTOR_SAFETY_CAP,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Small smoke-test run
    pub fn quick() -> Self {
        Self {
            trials: 50,
            ..Default::default()
        }
    }

    /// Large run for tuning the weapon and trait tables
    pub fn balance_sweep() -> Self {
        Self {
            trials: 5_000,
            seed: Some(0),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }
}

/// A matchup as stored on disk: two profiles and an optional registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupFile {
    pub a: CombatantProfile,
    pub b: CombatantProfile,
    /// Falls back to the built-in tables when absent.
    #[serde(default)]
    pub registry: Option<Registry>,
}

impl MatchupFile {
    pub fn from_json(json: &str) -> Result<Self, DuelError> {
        let matchup: MatchupFile = serde_json::from_str(json)?;
        if let Some(registry) = &matchup.registry {
            registry.validate()?;
        }
        Ok(matchup)
    }

    /// The registry this matchup runs against.
    pub fn registry(&self) -> Registry {
        self.registry.clone().unwrap_or_default()
    }
}
