//! Validation errors raised while setting up a duel.
//!
//! The loop itself cannot fail: once both combatants and the registry pass
//! validation, a duel always runs to an outcome.

/// Errors surfaced before any combat step runs.
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    /// Both sides carry the same combatant id.
    #[error("both combatants share id {id}")]
    DuplicateCombatant { id: u64 },

    /// A stat is larger than the engine supports.
    #[error("combatant {id}: {stat} = {value} exceeds the maximum of {max}")]
    StatOutOfRange {
        id: u64,
        stat: &'static str,
        value: u32,
        max: u32,
    },

    /// Neither combatant can ever fill a meter.
    #[error("both combatants have zero speed; no meter can fill")]
    Immobile,

    /// A weapon effect probability is outside `[0, 1]`.
    #[error("weapon '{weapon}': {field} = {value} is not a probability")]
    InvalidProbability {
        weapon: String,
        field: &'static str,
        value: f64,
    },

    /// A weapon damage bonus is outside `[-MAX_STAT, MAX_STAT]`.
    #[error("weapon '{weapon}': damage bonus {value} exceeds the limit of {max}")]
    InvalidBonus {
        weapon: String,
        value: i32,
        max: u32,
    },

    /// A combatant holds a weapon that is also in its inventory.
    #[error("combatant {id}: '{weapon}' is both held and stored")]
    WeaponHeldAndStored { id: u64, weapon: String },

    /// A companion meter multiplier is not a positive finite number.
    #[error("trait '{trait_id}': meter multiplier {value} must be positive")]
    InvalidMultiplier { trait_id: String, value: f64 },

    /// Registry or matchup JSON could not be parsed.
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DuelError {
    /// Short machine-readable category, used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateCombatant { .. } => "duplicate_combatant",
            Self::StatOutOfRange { .. } => "stat_out_of_range",
            Self::Immobile => "immobile",
            Self::InvalidProbability { .. } => "invalid_probability",
            Self::InvalidBonus { .. } => "invalid_bonus",
            Self::WeaponHeldAndStored { .. } => "weapon_held_and_stored",
            Self::InvalidMultiplier { .. } => "invalid_multiplier",
            Self::Parse(_) => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = DuelError::StatOutOfRange {
            id: 7,
            stat: "vitality",
            value: 99_999,
            max: 10_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("combatant 7"));
        assert!(msg.contains("vitality"));
        assert_eq!(err.as_str(), "stat_out_of_range");
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DuelError = parse.into();
        assert_eq!(err.as_str(), "parse");
    }
}
