//! Monte Carlo win-rate predictor.
//!
//! Runs the exact duel engine many times with events discarded and a
//! resolution cap. Trials are independent, so they run on the rayon pool;
//! each trial seeds its own RNG from the base seed plus its index, which
//! keeps results identical whatever the thread count.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::config::SimConfig;
use super::report::{PredictionReport, TrialResult};
use crate::combat::{CombatantProfile, Duel, DuelConfig, DuelError, NullSink, Registry};

/// Estimate A's chance of beating B over `config.trials` duels.
pub fn predict_win_rate(
    a: &CombatantProfile,
    b: &CombatantProfile,
    registry: &Registry,
    config: &SimConfig,
) -> Result<PredictionReport, DuelError> {
    let duel = Duel::new(a, b, registry)?.with_config(DuelConfig::approximate(config.max_resolutions));
    let base_seed = config.seed.unwrap_or_else(rand::random);

    let trials: Vec<TrialResult> = (0..config.trials)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let outcome = duel.clone().run(&mut rng, &mut NullSink);
            if config.verbosity >= 2 {
                tracing::debug!(
                    trial = i,
                    winner = %outcome.winner,
                    resolutions = outcome.resolutions,
                    capped = outcome.capped,
                    "trial finished"
                );
            }
            TrialResult::from(&outcome)
        })
        .collect();

    let report = PredictionReport::from_trials(&a.name, &b.name, config.seed, &trials);
    if config.verbosity >= 1 {
        tracing::info!(
            a = a.id,
            b = b.id,
            trials = report.trials,
            win_rate_a = report.win_rate_a,
            capped = report.capped,
            "prediction finished"
        );
    }
    Ok(report)
}

/// A's win percentage, `wins / trials * 100`.
pub fn win_percentage(
    a: &CombatantProfile,
    b: &CombatantProfile,
    registry: &Registry,
    config: &SimConfig,
) -> Result<f64, DuelError> {
    predict_win_rate(a, b, registry, config).map(|r| r.win_rate_a)
}
