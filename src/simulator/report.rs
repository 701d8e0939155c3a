//! Prediction report generation.

use serde::Serialize;

use crate::combat::{DuelOutcome, Side};

/// What one trial contributes to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialResult {
    pub winner: Side,
    pub capped: bool,
    pub resolutions: u32,
    pub winner_hp: i32,
}

impl From<&DuelOutcome> for TrialResult {
    fn from(outcome: &DuelOutcome) -> Self {
        Self {
            winner: outcome.winner,
            capped: outcome.capped,
            resolutions: outcome.resolutions,
            winner_hp: outcome.winner_hp(),
        }
    }
}

/// Aggregated results of a win-rate prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub a_name: String,
    pub b_name: String,
    pub trials: u32,
    pub wins_a: u32,
    pub wins_b: u32,
    /// `wins_a / trials * 100`
    pub win_rate_a: f64,
    /// Trials the safety cap decided on HP
    pub capped: u32,
    pub avg_resolutions: f64,
    pub avg_winner_hp: f64,
    pub seed: Option<u64>,
}

impl PredictionReport {
    pub fn from_trials(a_name: &str, b_name: &str, seed: Option<u64>, trials: &[TrialResult]) -> Self {
        let n = trials.len() as u32;
        let wins_a = trials.iter().filter(|t| t.winner == Side::A).count() as u32;
        let capped = trials.iter().filter(|t| t.capped).count() as u32;
        let denom = n.max(1) as f64;

        let avg_resolutions = trials.iter().map(|t| t.resolutions as f64).sum::<f64>() / denom;
        let avg_winner_hp = trials.iter().map(|t| t.winner_hp as f64).sum::<f64>() / denom;
        let win_rate_a = if n == 0 {
            0.0
        } else {
            wins_a as f64 / n as f64 * 100.0
        };

        Self {
            a_name: a_name.to_string(),
            b_name: b_name.to_string(),
            trials: n,
            wins_a,
            wins_b: n - wins_a,
            win_rate_a,
            capped,
            avg_resolutions,
            avg_winner_hp,
            seed,
        }
    }

    pub fn win_rate_b(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            100.0 - self.win_rate_a
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    WIN-RATE PREDICTION\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "  {} (A)  vs  {} (B)\n",
            display_name(&self.a_name, "A"),
            display_name(&self.b_name, "B")
        ));
        report.push_str(&format!("  Trials: {}", self.trials));
        if let Some(seed) = self.seed {
            report.push_str(&format!("  (seed {})", seed));
        }
        report.push_str("\n\n");

        report.push_str("── OUTCOME ──────────────────────────────────────────────────────\n");
        for (label, wins, pct) in [
            ("A", self.wins_a, self.win_rate_a),
            ("B", self.wins_b, self.win_rate_b()),
        ] {
            let bar: String = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!(
                "  {} wins: {:>6} {:>5.1}% {}\n",
                label, wins, pct, bar
            ));
        }
        report.push('\n');

        report.push_str("── PACING ───────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Resolutions:   {:.1}\n",
            self.avg_resolutions
        ));
        report.push_str(&format!("  Avg Winner HP:     {:.1}\n", self.avg_winner_hp));
        report.push_str(&format!("  Capped Trials:     {}\n", self.capped));

        if self.trials > 0 && self.capped * 10 > self.trials {
            report.push_str("  ⚠️  Many trials hit the cap - matchup may be a stalemate\n");
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn display_name<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.is_empty() {
        fallback
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(winner: Side, capped: bool, resolutions: u32, winner_hp: i32) -> TrialResult {
        TrialResult {
            winner,
            capped,
            resolutions,
            winner_hp,
        }
    }

    #[test]
    fn test_report_from_trials() {
        let trials = vec![
            trial(Side::A, false, 10, 50),
            trial(Side::A, false, 20, 30),
            trial(Side::B, true, 1000, 10),
            trial(Side::A, false, 30, 10),
        ];
        let report = PredictionReport::from_trials("Ogre", "Imp", Some(9), &trials);
        assert_eq!(report.trials, 4);
        assert_eq!(report.wins_a, 3);
        assert_eq!(report.wins_b, 1);
        assert!((report.win_rate_a - 75.0).abs() < 1e-9);
        assert!((report.win_rate_b() - 25.0).abs() < 1e-9);
        assert_eq!(report.capped, 1);
        assert!((report.avg_resolutions - 265.0).abs() < 1e-9);
        assert!((report.avg_winner_hp - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report() {
        let report = PredictionReport::from_trials("", "", None, &[]);
        assert_eq!(report.trials, 0);
        assert_eq!(report.win_rate_a, 0.0);
        assert_eq!(report.win_rate_b(), 0.0);
        assert!(report.to_text().contains("A (A)  vs  B (B)"));
    }

    #[test]
    fn test_report_json_fields() {
        let report = PredictionReport::from_trials("Ogre", "Imp", None, &[trial(Side::A, false, 5, 1)]);
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json()).expect("report is valid JSON");
        assert_eq!(json["wins_a"], 1);
        assert_eq!(json["win_rate_a"], 100.0);
        assert_eq!(json["a_name"], "Ogre");
    }
}
