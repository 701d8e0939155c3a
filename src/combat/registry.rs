//! Static game-balance tables: weapon definitions and trait definitions.
//!
//! The registry is read-only for the length of a duel. It is passed into the
//! engine explicitly so tests can run against synthetic tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::DuelError;
use super::types::StatKind;
use crate::core::constants::*;

/// Weapon range categorization, governs range counters, block and durability.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RangeClass {
    Short,
    Long,
    Shield,
}

impl RangeClass {
    /// Chance per landed swing that the wielder loses grip on the weapon.
    pub fn drop_chance(self) -> f64 {
        match self {
            RangeClass::Short => DROP_CHANCE_SHORT,
            RangeClass::Long => DROP_CHANCE_LONG,
            RangeClass::Shield => DROP_CHANCE_SHIELD,
        }
    }
}

/// Optional on-hit and defensive effects of a weapon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponEffects {
    pub stun_chance: Option<f64>,
    pub block_chance: Option<f64>,
    pub counter_chance: Option<f64>,
}

/// Permanent stat grant applied when a weapon is first acquired.
///
/// Acquisition happens outside of combat; the engine carries it but never applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonus {
    pub stat: StatKind,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDef {
    pub damage_bonus: i32,
    pub range_class: RangeClass,
    #[serde(default)]
    pub stat_bonus: Option<StatBonus>,
    #[serde(default)]
    pub effects: WeaponEffects,
}

impl WeaponDef {
    pub fn new(damage_bonus: i32, range_class: RangeClass) -> Self {
        Self {
            damage_bonus,
            range_class,
            stat_bonus: None,
            effects: WeaponEffects::default(),
        }
    }

    pub fn with_stun(mut self, chance: f64) -> Self {
        self.effects.stun_chance = Some(chance);
        self
    }

    pub fn with_block(mut self, chance: f64) -> Self {
        self.effects.block_chance = Some(chance);
        self
    }

    pub fn with_counter(mut self, chance: f64) -> Self {
        self.effects.counter_chance = Some(chance);
        self
    }

    pub fn with_stat_bonus(mut self, stat: StatKind, amount: i32) -> Self {
        self.stat_bonus = Some(StatBonus { stat, amount });
        self
    }

    pub fn stun_chance(&self) -> f64 {
        self.effects.stun_chance.unwrap_or(0.0)
    }

    /// Block only applies to shield-class weapons.
    pub fn block_chance(&self) -> f64 {
        match self.range_class {
            RangeClass::Shield => self.effects.block_chance.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn counter_chance(&self) -> f64 {
        self.effects.counter_chance.unwrap_or(DEFAULT_COUNTER_CHANCE)
    }
}

/// Closed trait vocabulary. Profiles name traits in snake_case.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TraitKind {
    /// 33% crit chance instead of 10%
    CriticalStrike,
    /// Flat 10% damage reduction
    Armored,
    /// Three consecutive hits taken trigger sticky rage mode
    Rage,
    /// 10% chance to counter after any attack against it
    CounterAttack,
    /// Double speed below 20% HP
    Adrenaline,
    /// Starts the duel behind a guardian shield
    Guardian,
    /// Reflects 10% of melee and thrown damage taken
    Thorns,
    /// Minor ally on its own meter
    Sidekick,
    /// Swarm that chips damage and blinds
    Swarm,
    /// Spirit that disarms or swaps the opponent's weapon
    Saboteur,
}

/// Companion presences granted by traits, in resolution priority order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompanionKind {
    Sidekick,
    Swarm,
    Saboteur,
}

impl CompanionKind {
    pub fn source_trait(self) -> TraitKind {
        match self {
            CompanionKind::Sidekick => TraitKind::Sidekick,
            CompanionKind::Swarm => TraitKind::Swarm,
            CompanionKind::Saboteur => TraitKind::Saboteur,
        }
    }

    pub fn default_meter_multiplier(self) -> f64 {
        match self {
            CompanionKind::Sidekick => SIDEKICK_METER_MULTIPLIER,
            CompanionKind::Swarm => SWARM_METER_MULTIPLIER,
            CompanionKind::Saboteur => SABOTEUR_METER_MULTIPLIER,
        }
    }
}

impl TraitKind {
    /// The companion this trait spawns, if any.
    pub fn companion(self) -> Option<CompanionKind> {
        match self {
            TraitKind::Sidekick => Some(CompanionKind::Sidekick),
            TraitKind::Swarm => Some(CompanionKind::Swarm),
            TraitKind::Saboteur => Some(CompanionKind::Saboteur),
            TraitKind::CriticalStrike
            | TraitKind::Armored
            | TraitKind::Rage
            | TraitKind::CounterAttack
            | TraitKind::Adrenaline
            | TraitKind::Guardian
            | TraitKind::Thorns => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDef {
    pub description: String,
    /// Companion meter rate relative to the owner's speed.
    #[serde(default)]
    pub meter_multiplier: Option<f64>,
}

impl TraitDef {
    fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            meter_multiplier: None,
        }
    }

    fn companion(description: &str, multiplier: f64) -> Self {
        Self {
            description: description.to_string(),
            meter_multiplier: Some(multiplier),
        }
    }
}

/// Weapon and trait tables consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default = "default_weapons")]
    pub weapons: BTreeMap<String, WeaponDef>,
    #[serde(default = "default_traits")]
    pub traits: BTreeMap<TraitKind, TraitDef>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            weapons: default_weapons(),
            traits: default_traits(),
        }
    }
}

impl Registry {
    /// Registry with no weapons and no traits.
    pub fn empty() -> Self {
        Self {
            weapons: BTreeMap::new(),
            traits: BTreeMap::new(),
        }
    }

    /// Parse a registry from JSON and validate it.
    ///
    /// Missing `weapons` or `traits` tables fall back to the built-in defaults.
    pub fn from_json(json: &str) -> Result<Self, DuelError> {
        let registry: Registry = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn with_weapon(mut self, name: &str, def: WeaponDef) -> Self {
        self.weapons.insert(name.to_string(), def);
        self
    }

    pub fn with_trait(mut self, kind: TraitKind, def: TraitDef) -> Self {
        self.traits.insert(kind, def);
        self
    }

    /// Weapon lookup. Unknown names yield `None` and count as "no weapon".
    pub fn weapon(&self, name: &str) -> Option<&WeaponDef> {
        self.weapons.get(name)
    }

    /// Damage bonus for a weapon name, zero for unknown names.
    pub fn weapon_bonus(&self, name: &str) -> i32 {
        self.weapon(name).map_or(0, |w| w.damage_bonus)
    }

    pub fn trait_def(&self, kind: TraitKind) -> Option<&TraitDef> {
        self.traits.get(&kind)
    }

    pub fn knows_trait(&self, kind: TraitKind) -> bool {
        self.traits.contains_key(&kind)
    }

    /// Meter rate of a companion, falling back to the built-in multiplier.
    pub fn companion_multiplier(&self, companion: CompanionKind) -> f64 {
        self.trait_def(companion.source_trait())
            .and_then(|d| d.meter_multiplier)
            .unwrap_or_else(|| companion.default_meter_multiplier())
    }

    /// Reject probabilities outside `[0, 1]`, damage bonuses beyond `MAX_STAT`
    /// and non-positive meter multipliers.
    pub fn validate(&self) -> Result<(), DuelError> {
        for (name, weapon) in &self.weapons {
            if weapon.damage_bonus.unsigned_abs() > MAX_STAT {
                return Err(DuelError::InvalidBonus {
                    weapon: name.clone(),
                    value: weapon.damage_bonus,
                    max: MAX_STAT,
                });
            }
            let fields = [
                ("stun_chance", weapon.effects.stun_chance),
                ("block_chance", weapon.effects.block_chance),
                ("counter_chance", weapon.effects.counter_chance),
            ];
            for (field, value) in fields {
                if let Some(value) = value {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(DuelError::InvalidProbability {
                            weapon: name.clone(),
                            field,
                            value,
                        });
                    }
                }
            }
        }
        for (kind, def) in &self.traits {
            if let Some(m) = def.meter_multiplier {
                if !m.is_finite() || m <= 0.0 {
                    return Err(DuelError::InvalidMultiplier {
                        trait_id: kind.to_string(),
                        value: m,
                    });
                }
            }
        }
        Ok(())
    }
}

fn default_weapons() -> BTreeMap<String, WeaponDef> {
    let table = [
        ("dagger", WeaponDef::new(3, RangeClass::Short)),
        (
            "sword",
            WeaponDef::new(5, RangeClass::Short).with_stun(0.05),
        ),
        (
            "club",
            WeaponDef::new(4, RangeClass::Short)
                .with_stun(0.15)
                .with_stat_bonus(StatKind::Power, 1),
        ),
        ("axe", WeaponDef::new(7, RangeClass::Short)),
        (
            "spear",
            WeaponDef::new(6, RangeClass::Long).with_counter(0.30),
        ),
        (
            "whip",
            WeaponDef::new(3, RangeClass::Long).with_stat_bonus(StatKind::Agility, 2),
        ),
        (
            "trident",
            WeaponDef::new(8, RangeClass::Long)
                .with_stun(0.05)
                .with_counter(0.20),
        ),
        (
            "buckler",
            WeaponDef::new(1, RangeClass::Shield).with_block(0.30),
        ),
        (
            "tower_shield",
            WeaponDef::new(0, RangeClass::Shield)
                .with_block(0.45)
                .with_stat_bonus(StatKind::Vitality, 3),
        ),
    ];
    table
        .into_iter()
        .map(|(name, def)| (name.to_string(), def))
        .collect()
}

fn default_traits() -> BTreeMap<TraitKind, TraitDef> {
    let mut traits = BTreeMap::new();
    traits.insert(
        TraitKind::CriticalStrike,
        TraitDef::new("Critical hits land a third of the time"),
    );
    traits.insert(TraitKind::Armored, TraitDef::new("Takes 10% less damage"));
    traits.insert(
        TraitKind::Rage,
        TraitDef::new("Enters rage after three hits in a row"),
    );
    traits.insert(
        TraitKind::CounterAttack,
        TraitDef::new("Sometimes strikes back when attacked"),
    );
    traits.insert(
        TraitKind::Adrenaline,
        TraitDef::new("Moves twice as fast when nearly dead"),
    );
    traits.insert(
        TraitKind::Guardian,
        TraitDef::new("Fights behind a guardian shield"),
    );
    traits.insert(
        TraitKind::Thorns,
        TraitDef::new("Reflects part of the damage it takes"),
    );
    traits.insert(
        TraitKind::Sidekick,
        TraitDef::companion("A small ally joins the fight", SIDEKICK_METER_MULTIPLIER),
    );
    traits.insert(
        TraitKind::Swarm,
        TraitDef::companion("A swarm harasses the opponent", SWARM_METER_MULTIPLIER),
    );
    traits.insert(
        TraitKind::Saboteur,
        TraitDef::companion(
            "A spirit meddles with the opponent's weapons",
            SABOTEUR_METER_MULTIPLIER,
        ),
    );
    traits
}
